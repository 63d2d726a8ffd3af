//! HTTP API for Flux Journal

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::runtime::RuntimeHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: RuntimeHandle,
}

impl AppState {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }
}
