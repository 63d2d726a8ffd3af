//! Configuration for the text-generation service

use super::retry::RetryPolicy;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Sent as the `key` query parameter; may be empty
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub retry: RetryPolicy,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let mut retry = defaults.retry;

        if let Some(attempts) = lookup("FLUX_RETRY_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
            retry.max_attempts = attempts;
        }
        if let Some(ms) = lookup("FLUX_RETRY_BASE_DELAY_MS").and_then(|v| v.parse().ok()) {
            retry.base_delay = Duration::from_millis(ms);
        }

        Self {
            api_key: lookup("GEMINI_API_KEY").unwrap_or_default(),
            model: lookup("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            retry,
        }
    }
}
