//! Pure state transition function
//!
//! Given the same state and event this always yields the same new state and
//! effects. Rendering, storage and network calls happen in the runtime.

use super::state::{Message, SessionPhase, SessionState, Transcript, INTRO_TEXT};
use super::{Effect, Event, SessionContext};
use crate::api::{ChatReply, ChatRequest};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Still waiting for the DungeonMind to answer, try again in a moment")]
    RequestInFlight,
    #[error("The session has ended")]
    SessionEnded,
    #[error("Discarding reply for request {0}: no longer awaited")]
    StaleReply(u64),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &SessionState,
    _context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        // ============================================================
        // Initialization
        // ============================================================

        // First visit: seed with the introduction and type it out
        (SessionPhase::Starting, Event::Restored { snapshot: None }) => {
            let intro = Message::assistant(INTRO_TEXT);
            let new_state = SessionState {
                phase: SessionPhase::Idle,
                transcript: Transcript::from(vec![intro.clone()]),
                next_request_id: state.next_request_id,
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::PersistTranscript)
                .with_effect(Effect::show_typed(intro))
                .with_effect(Effect::ScrollToBottom))
        }

        // Reload: replay the stored log without animation
        (SessionPhase::Starting, Event::Restored { snapshot: Some(messages) }) => {
            let transcript = Transcript::from(messages);
            let replay: Vec<Effect> = transcript
                .visible()
                .cloned()
                .map(Effect::show_instant)
                .collect();
            let new_state = SessionState {
                phase: SessionPhase::Idle,
                transcript,
                next_request_id: state.next_request_id,
            };
            Ok(TransitionResult::new(new_state)
                .with_effects(replay)
                .with_effect(Effect::ScrollToBottom))
        }

        // ============================================================
        // User Input
        // ============================================================

        // Blank input is ignored in every phase
        (_, Event::UserInput { text }) if text.trim().is_empty() => {
            Ok(TransitionResult::new(state.clone()))
        }

        (SessionPhase::Idle, Event::UserInput { text }) => {
            let request_id = state.next_request_id;
            let user_turn = Message::user(text.clone());

            let mut transcript = state.transcript.clone();
            transcript.push(user_turn.clone());

            let request = ChatRequest {
                user_message: text,
                conversation_history: transcript.to_vec(),
            };
            let new_state = SessionState {
                phase: SessionPhase::AwaitingReply { request_id },
                transcript,
                next_request_id: request_id + 1,
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::show_instant(user_turn))
                .with_effect(Effect::ScrollToBottom)
                .with_effect(Effect::ShowPlaceholder)
                .with_effect(Effect::RequestChat {
                    request_id,
                    request,
                }))
        }

        (SessionPhase::AwaitingReply { .. }, Event::UserInput { .. }) => {
            Err(TransitionError::RequestInFlight)
        }

        (SessionPhase::Ended, Event::UserInput { .. }) => Err(TransitionError::SessionEnded),

        // ============================================================
        // Chat Responses
        // ============================================================
        (SessionPhase::AwaitingReply { request_id }, Event::ChatReply { request_id: got, reply })
            if request_id == got =>
        {
            let transcript = merge_reply(&state.transcript, reply);
            let assistant_turn = transcript
                .last()
                .cloned()
                .ok_or_else(|| TransitionError::InvalidTransition("empty transcript after reply".into()))?;
            let new_state = SessionState {
                phase: SessionPhase::Idle,
                transcript,
                next_request_id: state.next_request_id,
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::ClearPlaceholder)
                .with_effect(Effect::show_typed(assistant_turn))
                .with_effect(Effect::PersistTranscript)
                .with_effect(Effect::ScrollToBottom)
                .with_effect(Effect::ClearInput))
        }

        // Failed turn stays in the transcript; nothing is persisted
        (SessionPhase::AwaitingReply { request_id }, Event::ChatFailed { request_id: got, .. })
            if request_id == got =>
        {
            let new_state = SessionState {
                phase: SessionPhase::Idle,
                transcript: state.transcript.clone(),
                next_request_id: state.next_request_id,
            };
            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::ClearPlaceholder)
                .with_effect(Effect::chat_error())
                .with_effect(Effect::ScrollToBottom)
                .with_effect(Effect::ClearInput))
        }

        (_, Event::ChatReply { request_id, .. } | Event::ChatFailed { request_id, .. }) => {
            Err(TransitionError::StaleReply(request_id))
        }

        // ============================================================
        // Session End
        // ============================================================
        (SessionPhase::Ended, Event::EndSession) => Err(TransitionError::SessionEnded),

        (_, Event::EndSession) => {
            let new_state = SessionState {
                phase: SessionPhase::Ended,
                transcript: Transcript::new(),
                next_request_id: state.next_request_id,
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::ClearPersisted))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (phase, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {phase:?} with event {event:?}"
        ))),
    }
}

/// Fold a successful reply into the transcript: replacement history first,
/// then metadata entries, then the assistant turn.
fn merge_reply(current: &Transcript, reply: ChatReply) -> Transcript {
    let ChatReply {
        assistant_message,
        conversation_history,
        metadata,
    } = reply;

    let mut transcript = match conversation_history {
        Some(history) => Transcript::from(history),
        None => current.clone(),
    };
    transcript.extend(metadata);
    transcript.push(Message::assistant(assistant_message));
    transcript
}
