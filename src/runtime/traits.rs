//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::llm::{LlmRequest, LlmResponse, RemoteServiceError, RetryingService};
use async_trait::async_trait;
use std::sync::Arc;

/// Client for remote text generation, retries included
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, RemoteServiceError>;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, RemoteServiceError> {
        self.as_ref().generate(request).await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

#[async_trait]
impl LlmClient for RetryingService {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, RemoteServiceError> {
        RetryingService::generate(self, request).await
    }
}
