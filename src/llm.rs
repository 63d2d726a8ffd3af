//! Remote text-generation client
//!
//! A single-shot provider (`GeminiService`) behind the `LlmService` trait,
//! an optional logging decorator, and a retrying wrapper on top.

mod config;
mod error;
mod gemini;
mod retry;
mod types;


pub use config::LlmConfig;
pub use error::{LlmError, RemoteServiceError};
#[cfg(test)]
pub use error::LlmErrorKind;
pub use gemini::GeminiService;
pub use retry::RetryingService;
#[cfg(test)]
pub use retry::{RetryPolicy, Sleeper};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// One request, one response; no retrying
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
