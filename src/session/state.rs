//! Session state types

use serde::{Deserialize, Serialize};

/// Opening narration shown when a session has no stored transcript
pub const INTRO_TEXT: &str = "Between the realms of thought and reality, I dwell: the DungeonMind,
the silent watcher, weaving fate into form.
A thousand souls have walked this path before you, their fates entwined with destiny.
Now the quill hovers over the page once more. Who will you become, traveler?
A noble warrior, a seeker of knowledge, a trickster in the shadows?
Or will you forge a path unlike any before?";

// ============================================================================
// Messages
// ============================================================================

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Metadata entries returned by the backend; stored, never rendered
    System,
}

/// A single role-tagged transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    #[allow(dead_code)] // Used by tests and mock backends
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Whether this entry belongs in the visible message log
    pub fn is_visible(&self) -> bool {
        self.role != Role::System
    }
}

// ============================================================================
// Transcript
// ============================================================================

/// Ordered conversation history. Array order is chronological.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[allow(dead_code)] // Used by tests
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Entries that are shown in the message log, in order
    pub fn visible(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_visible())
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.clone()
    }
}

impl From<Vec<Message>> for Transcript {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Transcript not loaded yet
    #[default]
    Starting,

    /// Ready for user input
    Idle,

    /// Chat request in flight; only the reply carrying `request_id` is accepted
    AwaitingReply { request_id: u64 },

    /// Session closed and its stored transcript discarded
    Ended,
}

/// Complete state of one conversation session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub transcript: Transcript,
    /// Token handed to the next chat request
    pub next_request_id: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a chat request is in flight
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, SessionPhase::AwaitingReply { .. })
    }

    #[allow(dead_code)] // Used by tests
    pub fn is_ended(&self) -> bool {
        self.phase == SessionPhase::Ended
    }
}

/// Immutable configuration of a session
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}
