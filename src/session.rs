//! Conversation session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

pub mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::{Effect, RevealStyle};
pub use event::Event;
pub use state::{Message, Role, SessionContext, SessionState};
pub use transition::{transition, TransitionError};
