//! Bounded exponential-backoff retry
//!
//! Attempt `n` (1-based) that fails is followed by a sleep of
//! `base_delay * multiplier^(n-1)`, except the last one, which ends the call.

use super::types::{LlmRequest, LlmResponse};
use super::{LlmError, LlmService, RemoteServiceError};
use async_trait::async_trait;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; treated as at least 1
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based), saturating at
    /// `Duration::MAX`
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        self.multiplier
            .checked_pow(failed_attempt.saturating_sub(1))
            .map_or(Duration::MAX, |factor| self.base_delay.saturating_mul(factor))
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Injectable sleep so tests can observe backoff without waiting
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Every attempt failed
#[derive(Debug)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// Run `operation` until it succeeds or the policy's attempts are spent.
///
/// `operation` receives the 1-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<T, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                return Err(Exhausted { attempts: attempt, last: e });
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = %delay.as_millis(),
                    error = %e,
                    "Attempt failed, retrying"
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Wraps a single-shot service with [`retry_with_backoff`]
pub struct RetryingService {
    inner: Arc<dyn LlmService>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryingService {
    pub fn new(inner: Arc<dyn LlmService>, policy: RetryPolicy) -> Self {
        Self::with_sleeper(inner, policy, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(
        inner: Arc<dyn LlmService>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            inner,
            policy,
            sleeper,
        }
    }

    pub fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    pub async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, RemoteServiceError> {
        let inner = self.inner.as_ref();
        retry_with_backoff(&self.policy, self.sleeper.as_ref(), move |_| {
            inner.complete(request)
        })
        .await
        .map_err(|Exhausted { attempts, last }: Exhausted<LlmError>| {
            tracing::error!(
                model = %self.inner.model_id(),
                attempts,
                error = %last,
                "Remote service exhausted all attempts"
            );
            RemoteServiceError { attempts, last }
        })
    }
}
