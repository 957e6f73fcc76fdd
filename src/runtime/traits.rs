//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::character::CharacterPanel;
use crate::db::Database;
use crate::session::{Message, RevealStyle};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Session-scoped storage for the transcript snapshot
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Stored transcript, `None` on first visit
    async fn load(&self, session_id: &str) -> Result<Option<Vec<Message>>, String>;

    /// Replace the stored transcript
    async fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), String>;

    /// Forget the session
    async fn clear(&self, session_id: &str) -> Result<(), String>;
}

/// Output side of the client: message log, placeholder, panels
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Append a message to the log
    async fn show_message(&self, message: &Message, style: RevealStyle);

    async fn show_placeholder(&self);

    async fn clear_placeholder(&self);

    /// Append an error line to the log
    async fn show_error(&self, text: &str);

    /// Client-side notice that is not part of the conversation
    async fn show_notice(&self, text: &str);

    /// Render the character panel (sheet or error line)
    async fn show_character(&self, panel: &CharacterPanel);

    async fn show_dice_rolling(&self, sides: u32);

    async fn show_dice_result(&self, sides: u32, value: u32);

    /// Reset the input line
    async fn clear_input(&self);

    async fn scroll_to_bottom(&self);

    /// Finish running animations before exit
    async fn settle(&self);
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: TranscriptStore + ?Sized> TranscriptStore for Arc<T> {
    async fn load(&self, session_id: &str) -> Result<Option<Vec<Message>>, String> {
        (**self).load(session_id).await
    }

    async fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), String> {
        (**self).save(session_id, messages).await
    }

    async fn clear(&self, session_id: &str) -> Result<(), String> {
        (**self).clear(session_id).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as `TranscriptStore`
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[allow(dead_code)] // Useful for tests
    pub fn inner(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl TranscriptStore for DatabaseStorage {
    async fn load(&self, session_id: &str) -> Result<Option<Vec<Message>>, String> {
        self.db
            .load_transcript(session_id)
            .map_err(|e| e.to_string())
    }

    async fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), String> {
        self.db
            .save_transcript(session_id, messages)
            .map_err(|e| e.to_string())
    }

    async fn clear(&self, session_id: &str) -> Result<(), String> {
        self.db
            .clear_transcript(session_id)
            .map_err(|e| e.to_string())
    }
}

/// Process-local storage: nothing survives a restart
#[derive(Default)]
pub struct VolatileStorage {
    snapshots: Mutex<HashMap<String, Vec<Message>>>,
}

impl VolatileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot of a session
    #[allow(dead_code)] // Used by tests
    pub fn snapshot(&self, session_id: &str) -> Option<Vec<Message>> {
        self.snapshots.lock().unwrap().get(session_id).cloned()
    }
}

#[async_trait]
impl TranscriptStore for VolatileStorage {
    async fn load(&self, session_id: &str) -> Result<Option<Vec<Message>>, String> {
        Ok(self.snapshot(session_id))
    }

    async fn save(&self, session_id: &str, messages: &[Message]) -> Result<(), String> {
        self.snapshots
            .lock()
            .unwrap()
            .insert(session_id.to_string(), messages.to_vec());
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<(), String> {
        self.snapshots.lock().unwrap().remove(session_id);
        Ok(())
    }
}
