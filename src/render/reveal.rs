//! Typewriter reveal
//!
//! [`Typewriter`] is the pure part: it turns a string into per-tick
//! presentation ops. [`spawn_reveal`] drives it on a timer as a cancellable
//! task. Cancelling flushes the remaining text at once, so a superseded
//! reveal never leaves a message half written.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default per-character delay
pub const DEFAULT_TYPE_DELAY: Duration = Duration::from_millis(75);

/// Caret drawn after the most recently revealed character
pub const CARET: char = '|';

/// A single presentation step of a reveal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOp {
    Insert(char),
    ShowCaret,
    HideCaret,
}

/// Step-by-step reveal of one string
#[derive(Debug, Clone)]
pub struct Typewriter {
    chars: Vec<char>,
    pos: usize,
    caret_visible: bool,
    finished: bool,
}

impl Typewriter {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            caret_visible: false,
            finished: false,
        }
    }

    /// Ops for the next tick, `None` once everything is shown and the caret
    /// is gone.
    pub fn tick(&mut self) -> Option<Vec<RevealOp>> {
        if self.finished {
            return None;
        }
        if let Some(&c) = self.chars.get(self.pos) {
            let mut ops = Vec::with_capacity(3);
            if self.caret_visible {
                ops.push(RevealOp::HideCaret);
            }
            ops.push(RevealOp::Insert(c));
            ops.push(RevealOp::ShowCaret);
            self.pos += 1;
            self.caret_visible = true;
            return Some(ops);
        }

        self.finished = true;
        if self.caret_visible {
            self.caret_visible = false;
            Some(vec![RevealOp::HideCaret])
        } else {
            None
        }
    }

    /// Ops that finish the reveal immediately
    pub fn flush(&mut self) -> Vec<RevealOp> {
        let mut ops = Vec::with_capacity(self.remaining() + 1);
        if self.caret_visible {
            ops.push(RevealOp::HideCaret);
            self.caret_visible = false;
        }
        ops.extend(self.chars.iter().skip(self.pos).copied().map(RevealOp::Insert));
        self.pos = self.chars.len();
        self.finished = true;
        ops
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn remaining(&self) -> usize {
        self.chars.len() - self.pos
    }
}

/// Receives the ops of a running reveal
pub trait RevealSink: Send + 'static {
    fn apply(&mut self, op: RevealOp);

    /// Called once after the last op, whether completed or superseded
    fn finish(&mut self) {}
}

/// How a reveal task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Completed,
    /// Cancelled; the rest of the text was flushed in one go
    Superseded,
}

/// Handle to a running reveal
pub struct RevealHandle {
    cancel: CancellationToken,
    task: JoinHandle<RevealOutcome>,
}

impl RevealHandle {
    #[allow(dead_code)] // Used by tests
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the animation, flushing whatever is left
    pub async fn cancel(self) -> RevealOutcome {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the animation to run to completion
    pub async fn join(self) -> RevealOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "Reveal task aborted");
                RevealOutcome::Superseded
            }
        }
    }
}

/// Start revealing `text` into `sink`, one character per `delay`
pub fn spawn_reveal<S: RevealSink>(text: &str, delay: Duration, mut sink: S) -> RevealHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let mut typewriter = Typewriter::new(text);

    let task = tokio::spawn(async move {
        let outcome = loop {
            let Some(ops) = typewriter.tick() else {
                break RevealOutcome::Completed;
            };
            for op in ops {
                sink.apply(op);
            }
            if typewriter.is_finished() {
                break RevealOutcome::Completed;
            }

            tokio::select! {
                () = token.cancelled() => {
                    for op in typewriter.flush() {
                        sink.apply(op);
                    }
                    break RevealOutcome::Superseded;
                }
                () = tokio::time::sleep(delay) => {}
            }
        };
        sink.finish();
        outcome
    });

    RevealHandle { cancel, task }
}
