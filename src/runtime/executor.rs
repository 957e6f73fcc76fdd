//! Session runtime executor

use super::traits::{Presenter, TranscriptStore};
use crate::api::ChatApi;
use crate::character::load_character_panel;
use crate::command::{Command, HELP_TEXT};
use crate::dice::{roll_dice, DEFAULT_ROLL_DELAY};
use crate::session::{transition, Effect, Event, SessionContext, SessionState, TransitionError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;

/// Why the runtime stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// `/quit`: transcript kept for the next run
    Quit,
    /// `/end`: transcript discarded
    Ended,
    /// Input stream closed
    InputClosed,
}

/// Drives one session: owns its state, feeds events through the pure
/// transition function and performs the resulting effects.
pub struct SessionRuntime<S, A, P>
where
    S: TranscriptStore + 'static,
    A: ChatApi + 'static,
    P: Presenter + 'static,
{
    context: SessionContext,
    state: SessionState,
    storage: S,
    api: Arc<A>,
    presenter: Arc<P>,
    /// Lines typed by the user
    line_rx: mpsc::Receiver<String>,
    /// Chat results posted back by request tasks
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    /// Dice and character panel tasks; drained before the final settle
    panels: TaskTracker,
    roll_delay: Duration,
}

impl<S, A, P> SessionRuntime<S, A, P>
where
    S: TranscriptStore + 'static,
    A: ChatApi + 'static,
    P: Presenter + 'static,
{
    pub fn new(
        context: SessionContext,
        storage: S,
        api: Arc<A>,
        presenter: Arc<P>,
        line_rx: mpsc::Receiver<String>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(32);
        Self {
            context,
            state: SessionState::new(),
            storage,
            api,
            presenter,
            line_rx,
            event_rx,
            event_tx,
            panels: TaskTracker::new(),
            roll_delay: DEFAULT_ROLL_DELAY,
        }
    }

    pub fn with_roll_delay(mut self, delay: Duration) -> Self {
        self.roll_delay = delay;
        self
    }

    pub async fn run(mut self) -> SessionExit {
        tracing::info!(session_id = %self.context.session_id, "Starting session runtime");
        self.initialize().await;

        let mut input_open = true;
        let exit = loop {
            tokio::select! {
                Some(event) = self.event_rx.recv() => {
                    self.process_event(event).await;
                }
                line = self.line_rx.recv(), if input_open => match line {
                    Some(line) => {
                        if let Some(exit) = self.handle_line(line).await {
                            break exit;
                        }
                    }
                    None => input_open = false,
                },
            }

            // Let an in-flight turn land before honouring end of input
            if !input_open && !self.state.is_pending() {
                break SessionExit::InputClosed;
            }
        };

        self.panels.close();
        self.panels.wait().await;
        self.presenter.settle().await;
        tracing::info!(
            session_id = %self.context.session_id,
            exit = ?exit,
            transcript_len = self.state.transcript.len(),
            "Session runtime stopped"
        );
        exit
    }

    /// Load the stored transcript and replay or seed it
    async fn initialize(&mut self) {
        let snapshot = match self.storage.load(&self.context.session_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(error = %e, "Failed to restore transcript, starting fresh");
                None
            }
        };
        tracing::debug!(restored = ?snapshot.as_ref().map(Vec::len), "Transcript loaded");
        self.process_event(Event::Restored { snapshot }).await;
    }

    async fn handle_line(&mut self, line: String) -> Option<SessionExit> {
        match Command::parse(&line) {
            Command::Say(text) => self.process_event(Event::UserInput { text }).await,
            Command::Roll { sides } => self.roll(sides).await,
            Command::Character => self.load_character(),
            Command::Help => self.presenter.show_notice(HELP_TEXT).await,
            Command::Unknown(command) => {
                self.presenter
                    .show_notice(&format!("Unknown command {command}. {HELP_TEXT}"))
                    .await;
            }
            Command::Quit => return Some(SessionExit::Quit),
            Command::End => {
                self.process_event(Event::EndSession).await;
                return Some(SessionExit::Ended);
            }
        }
        None
    }

    async fn process_event(&mut self, event: Event) {
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                self.report_rejection(&e).await;
                return;
            }
        };

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect).await;
        }
    }

    async fn report_rejection(&self, error: &TransitionError) {
        match error {
            // User-facing
            TransitionError::RequestInFlight | TransitionError::SessionEnded => {
                tracing::debug!(error = %error, "Input rejected");
                self.presenter.show_notice(&error.to_string()).await;
            }
            TransitionError::StaleReply(request_id) => {
                tracing::warn!(request_id, "Discarding stale chat result");
            }
            TransitionError::InvalidTransition(_) => {
                tracing::error!(error = %error, "Invalid session transition");
            }
        }
    }

    async fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ShowMessage { message, style } => {
                self.presenter.show_message(&message, style).await;
            }
            Effect::ShowPlaceholder => self.presenter.show_placeholder().await,
            Effect::ClearPlaceholder => self.presenter.clear_placeholder().await,
            Effect::ShowError { text } => self.presenter.show_error(&text).await,
            Effect::PersistTranscript => {
                if let Err(e) = self
                    .storage
                    .save(&self.context.session_id, self.state.transcript.messages())
                    .await
                {
                    tracing::error!(error = %e, "Failed to persist transcript");
                }
            }
            Effect::ClearPersisted => {
                if let Err(e) = self.storage.clear(&self.context.session_id).await {
                    tracing::error!(error = %e, "Failed to clear stored transcript");
                }
            }
            Effect::RequestChat {
                request_id,
                request,
            } => {
                let api = Arc::clone(&self.api);
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let event = match api.chat(&request).await {
                        Ok(reply) => Event::ChatReply { request_id, reply },
                        Err(e) => Event::ChatFailed {
                            request_id,
                            message: e.to_string(),
                        },
                    };
                    let _ = event_tx.send(event).await;
                });
            }
            Effect::ClearInput => self.presenter.clear_input().await,
            Effect::ScrollToBottom => self.presenter.scroll_to_bottom().await,
        }
    }

    async fn roll(&self, sides: u32) {
        let rolled = roll_dice(sides, &mut rand::thread_rng());
        let value = match rolled {
            Ok(value) => value,
            Err(e) => {
                self.presenter.show_notice(&e.to_string()).await;
                return;
            }
        };

        let presenter = Arc::clone(&self.presenter);
        let delay = self.roll_delay;
        self.panels.spawn(async move {
            presenter.show_dice_rolling(sides).await;
            tokio::time::sleep(delay).await;
            presenter.show_dice_result(sides, value).await;
        });
    }

    fn load_character(&self) {
        let api = Arc::clone(&self.api);
        let presenter = Arc::clone(&self.presenter);
        self.panels.spawn(async move {
            let panel = load_character_panel(api.as_ref()).await;
            presenter.show_character(&panel).await;
        });
    }
}
