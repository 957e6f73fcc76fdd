//! Effects produced by state transitions

use crate::api::ChatRequest;
use crate::session::state::Message;

/// Generic text for a failed chat request
pub const CHAT_ERROR_TEXT: &str = "Failed to get response.";

/// How a message enters the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStyle {
    /// Written in one go
    Instant,
    /// Revealed character by character with a caret
    Typewriter,
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append a message to the log
    ShowMessage { message: Message, style: RevealStyle },

    /// Show the awaiting-response line with its cycling ellipsis
    ShowPlaceholder,

    /// Remove the awaiting-response line
    ClearPlaceholder,

    /// Append an error line to the log
    ShowError { text: String },

    /// Write the current transcript to session storage
    PersistTranscript,

    /// Drop the stored transcript for this session
    ClearPersisted,

    /// Post a turn to the chat endpoint (spawns as background task)
    RequestChat { request_id: u64, request: ChatRequest },

    /// Reset the input line
    ClearInput,

    /// Bring the most recent message into view
    ScrollToBottom,
}

impl Effect {
    pub fn show_instant(message: Message) -> Self {
        Effect::ShowMessage {
            message,
            style: RevealStyle::Instant,
        }
    }

    pub fn show_typed(message: Message) -> Self {
        Effect::ShowMessage {
            message,
            style: RevealStyle::Typewriter,
        }
    }

    pub fn chat_error() -> Self {
        Effect::ShowError {
            text: CHAT_ERROR_TEXT.to_string(),
        }
    }
}
