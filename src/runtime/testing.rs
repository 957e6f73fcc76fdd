//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::executor::{SessionExit, SessionRuntime};
use super::traits::*;
use crate::api::{ApiError, CharacterRecord, ChatApi, ChatReply, ChatRequest};
use crate::character::CharacterPanel;
use crate::session::{Message, RevealStyle, Role, SessionContext};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ============================================================================
// Mock Chat API
// ============================================================================

/// Mock backend that returns queued chat replies
pub struct MockChatApi {
    replies: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
    character: Mutex<Option<Result<CharacterRecord, ApiError>>>,
    /// Record of all chat requests made
    pub requests: Mutex<Vec<ChatRequest>>,
}

#[allow(dead_code)]
impl MockChatApi {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            character: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, reply: ChatReply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue a failed request
    pub fn queue_error(&self, error: ApiError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Result of the next `character()` call
    pub fn set_character(&self, result: Result<CharacterRecord, ApiError>) {
        *self.character.lock().unwrap() = Some(result);
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Result<ChatReply, ApiError> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::request_failed("No mock reply queued")))
    }
}

impl Default for MockChatApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.next_reply()
    }

    async fn character(&self) -> Result<CharacterRecord, ApiError> {
        self.character
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ApiError::request_failed("No mock character set")))
    }

    fn base_url(&self) -> &str {
        "http://mock"
    }
}

// ============================================================================
// Delayed Mock Chat API (for in-flight testing)
// ============================================================================

/// Mock backend that holds each request for a fixed delay
pub struct DelayedMockChatApi {
    inner: MockChatApi,
    delay: Duration,
}

impl DelayedMockChatApi {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockChatApi::new(),
            delay,
        }
    }

    pub fn queue_reply(&self, reply: ChatReply) {
        self.inner.queue_reply(reply);
    }

    pub fn set_character(&self, result: Result<CharacterRecord, ApiError>) {
        self.inner.set_character(result);
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl ChatApi for DelayedMockChatApi {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.delay).await;
        self.inner.next_reply()
    }

    async fn character(&self) -> Result<CharacterRecord, ApiError> {
        tokio::time::sleep(self.delay).await;
        self.inner.character().await
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}

// ============================================================================
// Recording Presenter
// ============================================================================

/// One call made on the presenter
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterCall {
    Message {
        role: Role,
        content: String,
        style: RevealStyle,
    },
    Placeholder,
    ClearPlaceholder,
    Error(String),
    Notice(String),
    Character(CharacterPanel),
    DiceRolling(u32),
    DiceResult(u32, u32),
    ClearInput,
    ScrollToBottom,
    Settle,
}

/// Presenter that records every call instead of drawing
#[derive(Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<PresenterCall>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Messages shown so far, in order
    pub fn shown_messages(&self) -> Vec<(Role, String, RevealStyle)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PresenterCall::Message {
                    role,
                    content,
                    style,
                } => Some((role, content, style)),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PresenterCall::Error(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PresenterCall::Notice(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &PresenterCall) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    fn record(&self, call: PresenterCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn show_message(&self, message: &Message, style: RevealStyle) {
        self.record(PresenterCall::Message {
            role: message.role,
            content: message.content.clone(),
            style,
        });
    }

    async fn show_placeholder(&self) {
        self.record(PresenterCall::Placeholder);
    }

    async fn clear_placeholder(&self) {
        self.record(PresenterCall::ClearPlaceholder);
    }

    async fn show_error(&self, text: &str) {
        self.record(PresenterCall::Error(text.to_string()));
    }

    async fn show_notice(&self, text: &str) {
        self.record(PresenterCall::Notice(text.to_string()));
    }

    async fn show_character(&self, panel: &CharacterPanel) {
        self.record(PresenterCall::Character(panel.clone()));
    }

    async fn show_dice_rolling(&self, sides: u32) {
        self.record(PresenterCall::DiceRolling(sides));
    }

    async fn show_dice_result(&self, sides: u32, value: u32) {
        self.record(PresenterCall::DiceResult(sides, value));
    }

    async fn clear_input(&self) {
        self.record(PresenterCall::ClearInput);
    }

    async fn scroll_to_bottom(&self) {
        self.record(PresenterCall::ScrollToBottom);
    }

    async fn settle(&self) {
        self.record(PresenterCall::Settle);
    }
}

// ============================================================================
// Test Session
// ============================================================================

const TEST_SESSION_ID: &str = "test-session";

/// A running session wired to in-memory mocks
pub struct TestSession<A: ChatApi + 'static> {
    pub storage: Arc<VolatileStorage>,
    pub api: Arc<A>,
    pub presenter: Arc<RecordingPresenter>,
    line_tx: Option<mpsc::Sender<String>>,
    handle: JoinHandle<SessionExit>,
}

impl TestSession<MockChatApi> {
    /// Session with an instant mock backend
    pub fn new() -> TestSessionBuilder<MockChatApi> {
        TestSessionBuilder::new(MockChatApi::new())
    }
}

pub struct TestSessionBuilder<A> {
    api: A,
    storage: Arc<VolatileStorage>,
    roll_delay: Duration,
}

impl<A: ChatApi + 'static> TestSessionBuilder<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            storage: Arc::new(VolatileStorage::new()),
            roll_delay: Duration::from_millis(500),
        }
    }

    /// Start from an existing store, as on a reload
    pub fn storage(mut self, storage: Arc<VolatileStorage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn roll_delay(mut self, delay: Duration) -> Self {
        self.roll_delay = delay;
        self
    }

    pub fn build(self) -> TestSession<A> {
        let api = Arc::new(self.api);
        let presenter = Arc::new(RecordingPresenter::new());
        let (line_tx, line_rx) = mpsc::channel(32);

        let runtime = SessionRuntime::new(
            SessionContext::new(TEST_SESSION_ID),
            self.storage.clone(),
            api.clone(),
            presenter.clone(),
            line_rx,
        )
        .with_roll_delay(self.roll_delay);

        let handle = tokio::spawn(runtime.run());

        TestSession {
            storage: self.storage,
            api,
            presenter,
            line_tx: Some(line_tx),
            handle,
        }
    }
}

impl<A: ChatApi + 'static> TestSession<A> {
    /// Type a line
    pub async fn send_line(&self, line: &str) {
        self.line_tx
            .as_ref()
            .expect("input already closed")
            .send(line.to_string())
            .await
            .expect("Failed to send line");
    }

    /// Close input and wait for the runtime to stop
    pub async fn finish(mut self) -> SessionExit {
        self.line_tx.take();
        self.handle.await.expect("runtime panicked")
    }

    /// Wait for the runtime to stop on its own (`/quit`, `/end`)
    pub async fn join(self) -> SessionExit {
        self.handle.await.expect("runtime panicked")
    }

    /// Poll the presenter until `predicate` holds or `timeout` passes
    pub async fn wait_for<F>(&self, timeout: Duration, predicate: F) -> bool
    where
        F: Fn(&[PresenterCall]) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if predicate(&self.presenter.calls()) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        predicate(&self.presenter.calls())
    }

    /// Wait until `count` turns have been closed out with `ClearInput`
    pub async fn wait_for_turns(&self, count: usize) -> bool {
        self.wait_for(Duration::from_secs(5), |calls| {
            calls
                .iter()
                .filter(|call| **call == PresenterCall::ClearInput)
                .count()
                >= count
        })
        .await
    }

    /// Stored transcript for the test session
    pub fn stored(&self) -> Option<Vec<Message>> {
        self.storage.snapshot(TEST_SESSION_ID)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CHARACTER_ERROR_TEXT;
    use crate::session::effect::CHAT_ERROR_TEXT;
    use crate::session::state::INTRO_TEXT;

    fn intro() -> Message {
        Message::assistant(INTRO_TEXT)
    }

    #[tokio::test]
    async fn test_mock_chat_api() {
        let mock = MockChatApi::new();
        mock.queue_reply(ChatReply::text("Hello"));

        let request = ChatRequest {
            user_message: "hi".to_string(),
            conversation_history: vec![Message::user("hi")],
        };
        let reply = mock.chat(&request).await.unwrap();
        assert_eq!(reply.assistant_message, "Hello");

        // Second call should fail (no more replies)
        assert!(mock.chat(&request).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_visit_seeds_intro() {
        let session = TestSession::new().build();
        let storage = session.storage.clone();
        let presenter = session.presenter.clone();

        assert_eq!(session.finish().await, SessionExit::InputClosed);

        assert_eq!(storage.snapshot(TEST_SESSION_ID), Some(vec![intro()]));
        assert_eq!(
            presenter.shown_messages(),
            vec![(Role::Assistant, INTRO_TEXT.to_string(), RevealStyle::Typewriter)]
        );
        assert_eq!(presenter.calls().last(), Some(&PresenterCall::Settle));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_replays_instantly() {
        let storage = Arc::new(VolatileStorage::new());
        let stored = vec![
            intro(),
            Message::user("I open the door."),
            Message::system("dm-notes: trap armed"),
            Message::assistant("It creaks."),
        ];
        storage.save(TEST_SESSION_ID, &stored).await.unwrap();

        let session = TestSessionBuilder::new(MockChatApi::new())
            .storage(storage.clone())
            .build();
        let presenter = session.presenter.clone();
        session.finish().await;

        // Metadata stays hidden; nothing is re-animated
        let shown = presenter.shown_messages();
        assert_eq!(shown.len(), 3);
        assert!(shown.iter().all(|(_, _, style)| *style == RevealStyle::Instant));
        assert_eq!(shown[1].1, "I open the door.");
        assert_eq!(storage.snapshot(TEST_SESSION_ID), Some(stored));
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_turn_is_persisted() {
        let session = TestSession::new().build();
        session.api.queue_reply(ChatReply::text("The goblin flees."));

        session.send_line("I attack the goblin.").await;
        assert!(session.wait_for_turns(1).await);

        let requests = session.api.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].user_message, "I attack the goblin.");
        assert_eq!(
            requests[0].conversation_history,
            vec![intro(), Message::user("I attack the goblin.")]
        );

        assert_eq!(
            session.stored(),
            Some(vec![
                intro(),
                Message::user("I attack the goblin."),
                Message::assistant("The goblin flees."),
            ])
        );

        let calls = session.presenter.calls();
        let placeholder = calls
            .iter()
            .position(|c| *c == PresenterCall::Placeholder)
            .unwrap();
        let cleared = calls
            .iter()
            .position(|c| *c == PresenterCall::ClearPlaceholder)
            .unwrap();
        assert!(placeholder < cleared);
        assert_eq!(session.finish().await, SessionExit::InputClosed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_turn_shows_one_error() {
        let session = TestSession::new().build();
        session
            .api
            .queue_error(ApiError::request_failed("connection refused"));

        session.send_line("Hello?").await;
        assert!(session.wait_for_turns(1).await);

        assert_eq!(session.presenter.errors(), vec![CHAT_ERROR_TEXT.to_string()]);
        // The user turn is shown but never stored
        assert_eq!(session.stored(), Some(vec![intro()]));
        assert_eq!(session.presenter.count(&PresenterCall::ClearPlaceholder), 1);

        // The session is usable again and the failed turn stays in memory
        session.api.queue_reply(ChatReply::text("Welcome."));
        session.send_line("Hello again.").await;
        assert!(session.wait_for_turns(2).await);
        let requests = session.api.recorded_requests();
        assert_eq!(
            requests[1].conversation_history,
            vec![intro(), Message::user("Hello?"), Message::user("Hello again.")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_can_replace_history() {
        let session = TestSession::new().build();
        session.api.queue_reply(ChatReply {
            assistant_message: "You rest.".to_string(),
            conversation_history: Some(vec![Message::assistant("Summary so far.")]),
            metadata: vec![Message::system("rest: long")],
        });

        session.send_line("I rest.").await;
        assert!(session.wait_for_turns(1).await);

        assert_eq!(
            session.stored(),
            Some(vec![
                Message::assistant("Summary so far."),
                Message::system("rest: long"),
                Message::assistant("You rest."),
            ])
        );
        // Metadata is never displayed
        assert!(session
            .presenter
            .shown_messages()
            .iter()
            .all(|(role, _, _)| *role != Role::System));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submit_rejected_while_waiting() {
        let api = DelayedMockChatApi::new(Duration::from_secs(2));
        api.queue_reply(ChatReply::text("Finally."));
        let session = TestSessionBuilder::new(api).build();

        session.send_line("First.").await;
        session.send_line("Second.").await;
        assert!(session.wait_for_turns(1).await);

        let requests = session.api.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].user_message, "First.");
        assert_eq!(session.presenter.notices().len(), 1);
        assert_eq!(session.presenter.count(&PresenterCall::Placeholder), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_sends_nothing() {
        let session = TestSession::new().build();
        session.send_line("   ").await;
        session.send_line("").await;
        let api = session.api.clone();
        let presenter = session.presenter.clone();

        session.finish().await;
        assert!(api.recorded_requests().is_empty());
        assert_eq!(presenter.shown_messages().len(), 1);
        assert_eq!(presenter.count(&PresenterCall::Placeholder), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_of_input_waits_for_reply() {
        let api = DelayedMockChatApi::new(Duration::from_secs(3));
        api.queue_reply(ChatReply::text("Just in time."));
        let session = TestSessionBuilder::new(api).build();
        let storage = session.storage.clone();

        session.send_line("Quick!").await;
        assert_eq!(session.finish().await, SessionExit::InputClosed);

        let stored = storage.snapshot(TEST_SESSION_ID).unwrap();
        assert_eq!(stored.last(), Some(&Message::assistant("Just in time.")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_clears_storage() {
        let session = TestSession::new().build();
        let storage = session.storage.clone();
        assert!(session
            .wait_for(Duration::from_secs(1), |calls| !calls.is_empty())
            .await);

        session.send_line("/end").await;
        assert_eq!(session.join().await, SessionExit::Ended);
        assert_eq!(storage.snapshot(TEST_SESSION_ID), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_keeps_storage() {
        let session = TestSession::new().build();
        let storage = session.storage.clone();

        session.send_line("/quit").await;
        assert_eq!(session.join().await, SessionExit::Quit);
        assert_eq!(storage.snapshot(TEST_SESSION_ID), Some(vec![intro()]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_roll_shows_result_after_delay() {
        let session = TestSessionBuilder::new(MockChatApi::new())
            .roll_delay(Duration::from_millis(500))
            .build();

        session.send_line("/roll 6").await;
        assert!(session
            .wait_for(Duration::from_secs(2), |calls| calls
                .iter()
                .any(|c| matches!(c, PresenterCall::DiceResult(6, _))))
            .await);

        let calls = session.presenter.calls();
        let rolling = calls
            .iter()
            .position(|c| *c == PresenterCall::DiceRolling(6))
            .unwrap();
        let result = calls
            .iter()
            .position(|c| matches!(c, PresenterCall::DiceResult(6, _)))
            .unwrap();
        assert!(rolling < result);
        if let PresenterCall::DiceResult(_, value) = calls[result] {
            assert!((1..=6).contains(&value));
        }

        // Dice never touch the transcript
        assert_eq!(session.stored(), Some(vec![intro()]));
        assert!(session.api.recorded_requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_sided_roll_is_a_notice() {
        let session = TestSession::new().build();
        session.send_line("/roll 0").await;
        let presenter = session.presenter.clone();
        session.finish().await;

        assert_eq!(presenter.notices().len(), 1);
        assert_eq!(presenter.count(&PresenterCall::DiceRolling(0)), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_character_failure_panel() {
        let session = TestSession::new().build();
        session
            .api
            .set_character(Err(ApiError::request_failed("500 Internal Server Error")));

        session.send_line("/character").await;
        let expected =
            PresenterCall::Character(CharacterPanel::Error(CHARACTER_ERROR_TEXT.to_string()));
        assert!(session
            .wait_for(Duration::from_secs(1), |calls| calls.contains(&expected))
            .await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_of_input_waits_for_dice() {
        let session = TestSessionBuilder::new(MockChatApi::new())
            .roll_delay(Duration::from_millis(500))
            .build();
        session.send_line("/roll 6").await;
        let presenter = session.presenter.clone();
        assert_eq!(session.finish().await, SessionExit::InputClosed);

        let calls = presenter.calls();
        let result = calls
            .iter()
            .position(|c| matches!(c, PresenterCall::DiceResult(6, _)))
            .expect("dice result dropped at exit");
        let settle = calls
            .iter()
            .position(|c| *c == PresenterCall::Settle)
            .unwrap();
        assert!(result < settle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_of_input_waits_for_character_panel() {
        let api = DelayedMockChatApi::new(Duration::from_secs(1));
        api.set_character(Err(ApiError::request_failed("503 Service Unavailable")));
        let session = TestSessionBuilder::new(api).build();
        session.send_line("/character").await;
        let presenter = session.presenter.clone();
        assert_eq!(session.finish().await, SessionExit::InputClosed);

        let calls = presenter.calls();
        let panel = calls
            .iter()
            .position(|c| matches!(c, PresenterCall::Character(CharacterPanel::Error(_))))
            .expect("character panel dropped at exit");
        assert_eq!(calls.last(), Some(&PresenterCall::Settle));
        assert!(panel < calls.len() - 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_command_is_not_sent() {
        let session = TestSession::new().build();
        session.send_line("/dance").await;
        let api = session.api.clone();
        let presenter = session.presenter.clone();
        session.finish().await;

        assert!(api.recorded_requests().is_empty());
        assert_eq!(presenter.notices().len(), 1);
        assert!(presenter.notices()[0].contains("/dance"));
    }
}
