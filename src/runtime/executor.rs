//! Editorial runtime executor

use super::traits::LlmClient;
use super::{Command, RuntimeHandle, SseEvent};

use crate::llm::LlmRequest;
use crate::prompts::REMOTE_FAILURE_MESSAGE;
use crate::state_machine::{transition, EditorialContext, EditorialState, Effect, Event, TransitionError};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};

const COMMAND_BUFFER: usize = 32;
const COMPLETION_BUFFER: usize = 32;
const BROADCAST_BUFFER: usize = 128;

/// Generic runtime that can work with any LLM client implementation
pub struct EditorialRuntime<L>
where
    L: LlmClient + 'static,
{
    context: EditorialContext,
    state: EditorialState,
    llm_client: Arc<L>,
    command_rx: mpsc::Receiver<Command>,
    /// Completions from spawned remote calls
    completion_rx: mpsc::Receiver<Event>,
    completion_tx: mpsc::Sender<Event>,
    state_tx: watch::Sender<EditorialState>,
    broadcast_tx: broadcast::Sender<SseEvent>,
}

impl<L> EditorialRuntime<L>
where
    L: LlmClient + 'static,
{
    /// Start the runtime on the current tokio runtime
    pub fn spawn(context: EditorialContext, state: EditorialState, llm_client: L) -> RuntimeHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (completion_tx, completion_rx) = mpsc::channel(COMPLETION_BUFFER);
        let (state_tx, state_rx) = watch::channel(state.clone());
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_BUFFER);

        let runtime = Self {
            context,
            state,
            llm_client: Arc::new(llm_client),
            command_rx,
            completion_rx,
            completion_tx,
            state_tx,
            broadcast_tx: broadcast_tx.clone(),
        };
        tokio::spawn(runtime.run());

        RuntimeHandle {
            command_tx,
            state_rx,
            broadcast_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(articles = self.state.articles.len(), "Starting editorial runtime");

        // Events are applied one at a time, whichever channel they arrive on
        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(Command { event, reply }) = command else {
                        break;
                    };
                    let _ = reply.send(self.process_event(event));
                }
                Some(event) = self.completion_rx.recv() => {
                    let _ = self.process_event(event);
                }
            }
        }

        tracing::info!("Editorial runtime stopped");
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let is_completion = event.is_completion();

        // Pure state transition
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) if is_completion => {
                // The draft moved on while the call was in flight
                tracing::debug!(error = %e, "Ignoring stale completion");
                if let TransitionError::StaleCompletion { request_id } = &e {
                    let _ = self.broadcast_tx.send(SseEvent::Notice {
                        event_type: "completion_discarded".to_string(),
                        data: json!({ "request_id": request_id }),
                    });
                }
                return Err(e);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Visitor action rejected");
                let _ = self.broadcast_tx.send(SseEvent::Error {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        self.state = result.new_state;
        self.state_tx.send_replace(self.state.clone());
        let _ = self.broadcast_tx.send(SseEvent::StateChange {
            state: serde_json::to_value(&self.state).unwrap_or(Value::Null),
        });

        for effect in result.effects {
            self.execute_effect(effect);
        }

        Ok(())
    }

    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::RequestExpansion {
                request_id,
                request,
            } => {
                self.spawn_request(
                    request_id,
                    request,
                    |request_id, text| Event::ExpansionComplete { request_id, text },
                    |request_id, message| Event::ExpansionFailed {
                        request_id,
                        message,
                    },
                );
            }

            Effect::RequestChatReply {
                request_id,
                request,
            } => {
                self.spawn_request(
                    request_id,
                    request,
                    |request_id, text| Event::ChatReplyReceived { request_id, text },
                    |request_id, message| Event::ChatReplyFailed {
                        request_id,
                        message,
                    },
                );
            }

            Effect::NotifyClient { event_type, data } => {
                let _ = self
                    .broadcast_tx
                    .send(SseEvent::Notice { event_type, data });
            }
        }
    }

    /// Run a remote call in the background and post its outcome as an event
    fn spawn_request(
        &self,
        request_id: u64,
        request: LlmRequest,
        on_success: fn(u64, String) -> Event,
        on_failure: fn(u64, String) -> Event,
    ) {
        let llm_client = self.llm_client.clone();
        let completion_tx = self.completion_tx.clone();

        tokio::spawn(async move {
            tracing::info!(request_id, "Making remote request (background)");

            let event = match llm_client.generate(&request).await {
                Ok(response) => on_success(request_id, response.text),
                Err(e) => {
                    tracing::warn!(request_id, error = %e, "Remote request failed");
                    on_failure(request_id, REMOTE_FAILURE_MESSAGE.to_string())
                }
            };

            if completion_tx.send(event).await.is_err() {
                tracing::debug!(request_id, "Runtime stopped before completion arrived");
            }
        });
    }
}
