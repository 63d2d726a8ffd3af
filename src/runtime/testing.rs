//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use crate::llm::{LlmError, LlmRequest, LlmResponse, RemoteServiceError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Semaphore;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
#[allow(dead_code)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, RemoteServiceError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
    /// Calls wait here until released; `None` answers immediately
    gate: Option<Semaphore>,
}

#[allow(dead_code)]
impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Client whose calls block until [`MockLlmClient::release`]
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::text(text)));
    }

    /// Queue an exhausted-retries error
    pub fn queue_error(&self, message: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Err(RemoteServiceError {
            attempts: 5,
            last: LlmError::server_error(message),
        }));
    }

    /// Let `calls` blocked calls proceed
    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, RemoteServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(RemoteServiceError {
                    attempts: 1,
                    last: LlmError::network("No mock response queued"),
                })
            })
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{GeminiService, LlmConfig, LlmService, RetryPolicy, RetryingService, Sleeper};
    use crate::prompts::{
        ASSISTANT_SYSTEM_INSTRUCTION, CHAT_ERROR_MESSAGE, EDITOR_SYSTEM_INSTRUCTION,
        REMOTE_FAILURE_MESSAGE,
    };
    use crate::runtime::{DispatchError, EditorialRuntime, RuntimeHandle, SseEvent};
    use crate::state_machine::state::{ChatMessage, ChatRole, Draft, ExpansionStatus, View};
    use crate::state_machine::{DraftEdit, EditorialContext, EditorialState, Event, TransitionError};
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn start(llm: Arc<MockLlmClient>) -> RuntimeHandle {
        EditorialRuntime::spawn(
            EditorialContext::default(),
            EditorialState::seeded(Utc::now()),
            llm,
        )
    }

    async fn wait_until(
        handle: &RuntimeHandle,
        predicate: impl Fn(&EditorialState) -> bool,
    ) -> EditorialState {
        let mut rx = handle.state_receiver();
        let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| predicate(s)))
            .await
            .expect("timed out waiting for state")
            .expect("runtime stopped")
            .clone();
        state
    }

    /// Next client notice, skipping state changes and errors
    async fn next_notice(
        events: &mut tokio::sync::broadcast::Receiver<SseEvent>,
    ) -> (String, serde_json::Value) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let SseEvent::Notice { event_type, data } = events.recv().await.unwrap() {
                    return (event_type, data);
                }
            }
        })
        .await
        .expect("timed out waiting for notice")
    }

    async fn write_draft(handle: &RuntimeHandle, title: &str, body: &str) {
        handle.dispatch(Event::OpenEditor).await.unwrap();
        handle
            .dispatch(Event::EditDraft(DraftEdit::Title(title.to_string())))
            .await
            .unwrap();
        handle
            .dispatch(Event::EditDraft(DraftEdit::Body(body.to_string())))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_chat_reply_is_appended() {
        let llm = Arc::new(MockLlmClient::new());
        llm.queue_response("Hello from the newsroom");
        let handle = start(llm.clone());

        handle
            .dispatch(Event::SendChatMessage {
                text: "hi".to_string(),
            })
            .await
            .unwrap();

        let state = wait_until(&handle, |s| s.chat.pending_replies == 0).await;
        assert_eq!(
            state.chat.messages,
            vec![
                ChatMessage::user("hi"),
                ChatMessage::assistant("Hello from the newsroom"),
            ]
        );

        let requests = llm.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "hi");
        assert_eq!(requests[0].system_instruction, ASSISTANT_SYSTEM_INSTRUCTION);
    }

    #[tokio::test]
    async fn test_blank_chat_message_is_rejected() {
        let handle = start(Arc::new(MockLlmClient::new()));
        let mut events = handle.subscribe();

        let outcome = handle
            .dispatch(Event::SendChatMessage {
                text: "  ".to_string(),
            })
            .await;

        assert!(matches!(
            outcome,
            Err(DispatchError::Rejected(TransitionError::EmptyMessage))
        ));
        assert!(handle.snapshot().chat.messages.is_empty());
        assert!(matches!(events.recv().await.unwrap(), SseEvent::Error { .. }));
    }

    /// Single-shot service that never answers
    struct Unreachable {
        calls: AtomicU32,
    }

    #[async_trait]
    impl LlmService for Unreachable {
        async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::network("connection refused"))
        }

        fn model_id(&self) -> &str {
            "unreachable"
        }
    }

    struct NoSleep;

    #[async_trait]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _duration: Duration) {}
    }

    #[tokio::test]
    async fn test_chat_shows_connection_error_after_retries() {
        let service = Arc::new(Unreachable {
            calls: AtomicU32::new(0),
        });
        let client = RetryingService::with_sleeper(
            service.clone(),
            RetryPolicy::default(),
            Arc::new(NoSleep),
        );
        let handle = EditorialRuntime::spawn(
            EditorialContext::default(),
            EditorialState::new(),
            client,
        );

        handle
            .dispatch(Event::SendChatMessage {
                text: "hi".to_string(),
            })
            .await
            .unwrap();

        let state = wait_until(&handle, |s| s.chat.pending_replies == 0).await;
        assert_eq!(state.chat.messages.len(), 2);
        assert_eq!(state.chat.messages[0], ChatMessage::user("hi"));
        assert_eq!(state.chat.messages[1].role, ChatRole::Assistant);
        assert_eq!(state.chat.messages[1].text, CHAT_ERROR_MESSAGE);
        assert_eq!(service.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_expansion_replaces_body_only() {
        let llm = Arc::new(MockLlmClient::new());
        llm.queue_response("A long, finished article.");
        let handle = start(llm.clone());

        write_draft(&handle, "Quiet Interfaces", "less noise").await;
        handle.dispatch(Event::ExpandDraft).await.unwrap();

        let state = wait_until(&handle, |s| s.expansion == ExpansionStatus::Idle).await;
        assert_eq!(state.draft.body, "A long, finished article.");
        assert_eq!(state.draft.title, "Quiet Interfaces");
        assert_eq!(state.view, View::Write);

        let requests = llm.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("\"less noise\""));
        assert!(requests[0].prompt.contains("Quiet Interfaces"));
        assert_eq!(requests[0].system_instruction, EDITOR_SYSTEM_INSTRUCTION);
    }

    #[tokio::test]
    async fn test_second_expansion_rejected_while_first_in_flight() {
        let llm = Arc::new(MockLlmClient::gated());
        llm.queue_response("expanded");
        let handle = start(llm.clone());

        write_draft(&handle, "T", "notes").await;
        handle.dispatch(Event::ExpandDraft).await.unwrap();

        let outcome = handle.dispatch(Event::ExpandDraft).await;
        assert!(matches!(
            outcome,
            Err(DispatchError::Rejected(TransitionError::Busy))
        ));

        // Other fields stay editable during the call
        handle
            .dispatch(Event::EditDraft(DraftEdit::Title("New title".to_string())))
            .await
            .unwrap();

        llm.release(1);
        let state = wait_until(&handle, |s| !s.expansion.is_busy()).await;
        assert_eq!(state.draft.body, "expanded");
        assert_eq!(state.draft.title, "New title");
        assert_eq!(llm.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_expansion_failure_keeps_draft() {
        let llm = Arc::new(MockLlmClient::new());
        llm.queue_error("overloaded");
        let handle = start(llm);
        let mut events = handle.subscribe();

        write_draft(&handle, "T", "notes").await;
        handle.dispatch(Event::ExpandDraft).await.unwrap();

        let state = wait_until(&handle, |s| {
            matches!(s.expansion, ExpansionStatus::Failed { .. })
        })
        .await;
        assert_eq!(state.draft.body, "notes");
        assert_eq!(
            state.expansion,
            ExpansionStatus::Failed {
                message: REMOTE_FAILURE_MESSAGE.to_string()
            }
        );

        let (event_type, data) = next_notice(&mut events).await;
        assert_eq!(event_type, "expansion_failed");
        assert_eq!(data["message"], REMOTE_FAILURE_MESSAGE);

        // A failed expansion can be retried
        handle.dispatch(Event::ExpandDraft).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_expansion_never_exposes_api_key() {
        let config = LlmConfig {
            api_key: "SECRET-KEY-123".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            retry: RetryPolicy {
                max_attempts: 1,
                ..RetryPolicy::default()
            },
            ..LlmConfig::default()
        };
        let gemini = GeminiService::new(&config).unwrap();
        let client = RetryingService::new(Arc::new(gemini), config.retry);
        let handle = EditorialRuntime::spawn(
            EditorialContext::default(),
            EditorialState::new(),
            client,
        );
        let mut events = handle.subscribe();

        handle
            .dispatch(Event::EditDraft(DraftEdit::Body("notes".to_string())))
            .await
            .unwrap();
        handle.dispatch(Event::ExpandDraft).await.unwrap();

        let state = wait_until(&handle, |s| {
            matches!(s.expansion, ExpansionStatus::Failed { .. })
        })
        .await;
        let json = serde_json::to_string(&state).unwrap();
        assert!(!json.contains("SECRET-KEY-123"), "key leaked into state: {json}");

        let (_, data) = next_notice(&mut events).await;
        assert!(!data.to_string().contains("SECRET-KEY-123"));
    }

    #[tokio::test]
    async fn test_cancel_discards_late_expansion() {
        let llm = Arc::new(MockLlmClient::gated());
        llm.queue_response("too late");
        let handle = start(llm.clone());
        let mut events = handle.subscribe();

        write_draft(&handle, "T", "notes").await;
        handle.dispatch(Event::ExpandDraft).await.unwrap();
        let request_id = match handle.snapshot().expansion {
            ExpansionStatus::Busy { request_id } => request_id,
            other => panic!("expected busy expansion, got {other:?}"),
        };
        handle.dispatch(Event::CancelDraft).await.unwrap();

        llm.release(1);
        let (event_type, data) = next_notice(&mut events).await;
        assert_eq!(event_type, "completion_discarded");
        assert_eq!(data["request_id"], request_id);

        let state = handle.snapshot();
        assert_eq!(state.draft, Draft::default());
        assert_eq!(state.expansion, ExpansionStatus::Idle);
        assert_eq!(state.view, View::Home);
    }

    #[tokio::test]
    async fn test_publish_prepends_and_notifies() {
        let handle = start(Arc::new(MockLlmClient::new()));
        write_draft(&handle, "Fresh", "Body text").await;
        let mut events = handle.subscribe();

        handle
            .dispatch(Event::PublishDraft { at: Utc::now() })
            .await
            .unwrap();

        let state = handle.snapshot();
        assert_eq!(state.articles.len(), 3);
        assert_eq!(state.articles[0].title, "Fresh");
        assert_eq!(state.articles[0].id, 3);
        assert_eq!(state.view, View::Home);

        assert!(matches!(
            events.recv().await.unwrap(),
            SseEvent::StateChange { .. }
        ));
        match events.recv().await.unwrap() {
            SseEvent::Notice { event_type, data } => {
                assert_eq!(event_type, "article_published");
                assert_eq!(data["id"], 3);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_publish_leaves_state_untouched() {
        let handle = start(Arc::new(MockLlmClient::new()));
        handle.dispatch(Event::OpenEditor).await.unwrap();
        handle
            .dispatch(Event::EditDraft(DraftEdit::Body("body only".to_string())))
            .await
            .unwrap();
        let before = handle.snapshot();

        let outcome = handle.dispatch(Event::PublishDraft { at: Utc::now() }).await;
        assert!(matches!(
            outcome,
            Err(DispatchError::Rejected(TransitionError::EmptyTitle))
        ));
        assert_eq!(handle.snapshot(), before);
    }
}
