//! Awaiting-response placeholder with a cycling ellipsis

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default time between ellipsis frames
pub const DEFAULT_ELLIPSIS_INTERVAL: Duration = Duration::from_millis(400);

/// Frames of the ellipsis, in order
pub const ELLIPSIS_FRAMES: [&str; 4] = ["", ".", "..", "..."];

/// Endless `"" -> "." -> ".." -> "..." -> ""` cycle
#[derive(Debug, Clone, Default)]
pub struct Ellipsis {
    frame: usize,
}

impl Iterator for Ellipsis {
    type Item = &'static str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = ELLIPSIS_FRAMES[self.frame];
        self.frame = (self.frame + 1) % ELLIPSIS_FRAMES.len();
        Some(current)
    }
}

/// Handle to the running placeholder animation
pub struct PlaceholderHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PlaceholderHandle {
    /// Stop the animation and wait for its last frame to be written
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Placeholder task aborted");
        }
    }
}

/// Redraw the placeholder with the next ellipsis frame every `interval`
/// until stopped
pub fn spawn_placeholder<F>(interval: Duration, mut draw: F) -> PlaceholderHandle
where
    F: FnMut(&str) + Send + 'static,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        for frame in Ellipsis::default() {
            draw(frame);
            tokio::select! {
                () = token.cancelled() => break,
                () = tokio::time::sleep(interval) => {}
            }
        }
    });

    PlaceholderHandle { cancel, task }
}
