//! Effects produced by state transitions

use crate::llm::LlmRequest;
use serde_json::{json, Value};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the text-generation service to expand the draft body
    RequestExpansion { request_id: u64, request: LlmRequest },

    /// Ask the text-generation service for a chat reply
    RequestChatReply { request_id: u64, request: LlmRequest },

    /// Notify connected clients
    NotifyClient { event_type: String, data: Value },
}

impl Effect {
    pub fn notify_article_published(id: u64) -> Self {
        Effect::NotifyClient {
            event_type: "article_published".to_string(),
            data: json!({ "id": id }),
        }
    }

    pub fn notify_expansion_failed(message: &str) -> Self {
        Effect::NotifyClient {
            event_type: "expansion_failed".to_string(),
            data: json!({ "message": message }),
        }
    }
}
