//! Runtime for driving a chat session
//!
//! Connects the pure session state machine to storage, the backend and the
//! terminal.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{SessionExit, SessionRuntime};
pub use traits::*;

use crate::api::{DungeonMindClient, LoggingApi};
use crate::render::TerminalPresenter;
use std::io::Stdout;
use std::sync::Arc;

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime = SessionRuntime<
    Arc<dyn TranscriptStore>,
    LoggingApi<DungeonMindClient>,
    TerminalPresenter<Stdout>,
>;
