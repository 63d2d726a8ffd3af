//! Runtime that owns the editorial state
//!
//! One task applies events in order; remote calls run as spawned tasks and
//! post their completions back as events.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::EditorialRuntime;

use crate::state_machine::{EditorialState, Event, TransitionError};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    /// Sent first on every new stream
    Init {
        state: serde_json::Value,
    },
    StateChange {
        state: serde_json::Value,
    },
    Notice {
        event_type: String,
        data: serde_json::Value,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Editorial runtime is not running")]
    Stopped,
}

/// A visitor action waiting for its outcome
pub(crate) struct Command {
    pub event: Event,
    pub reply: oneshot::Sender<Result<(), TransitionError>>,
}

/// Handle to interact with a running [`EditorialRuntime`]
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<EditorialState>,
    broadcast_tx: broadcast::Sender<SseEvent>,
}

impl RuntimeHandle {
    /// Apply a visitor action. Returns once the transition is applied, not
    /// when any remote call it started has finished.
    pub async fn dispatch(&self, event: Event) -> Result<(), DispatchError> {
        let (reply, outcome) = oneshot::channel();
        self.command_tx
            .send(Command { event, reply })
            .await
            .map_err(|_| DispatchError::Stopped)?;
        outcome.await.map_err(|_| DispatchError::Stopped)??;
        Ok(())
    }

    /// Current state
    pub fn snapshot(&self) -> EditorialState {
        self.state_rx.borrow().clone()
    }

    /// Receiver that observes every state change
    #[cfg(test)]
    pub fn state_receiver(&self) -> watch::Receiver<EditorialState> {
        self.state_rx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SseEvent> {
        self.broadcast_tx.subscribe()
    }
}
