//! Events that can occur in a session

use crate::api::ChatReply;
use crate::session::state::Message;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Lifecycle events
    /// Stored transcript lookup finished (`None` on first visit)
    Restored { snapshot: Option<Vec<Message>> },
    EndSession,

    // User events
    UserInput { text: String },

    // Chat API events
    ChatReply { request_id: u64, reply: ChatReply },
    ChatFailed { request_id: u64, message: String },
}
