//! Terminal rendering
//!
//! Animations (typewriter reveal, thinking placeholder) run as cancellable
//! tasks; [`TerminalPresenter`] owns them and draws everything else.

pub mod placeholder;
pub mod reveal;
mod terminal;

pub use placeholder::DEFAULT_ELLIPSIS_INTERVAL;
pub use reveal::DEFAULT_TYPE_DELAY;
pub use terminal::TerminalPresenter;
