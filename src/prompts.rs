//! Fixed prompts and system instructions for the magazine's AI features

use crate::llm::LlmRequest;

pub const EDITOR_SYSTEM_INSTRUCTION: &str =
    "You are a creative editor for a design magazine. Reply in the language of the notes.";

pub const ASSISTANT_SYSTEM_INSTRUCTION: &str =
    "You are the AI assistant of Flux Journal, a magazine about design, technology and culture.";

/// Shown in the chat transcript when the service cannot be reached
pub const CHAT_ERROR_MESSAGE: &str = "Connection error.";

/// Client-visible reason for a failed remote call; details stay in the logs
pub const REMOTE_FAILURE_MESSAGE: &str = "The AI service is unavailable. Try again later.";

/// Request that turns the draft's notes into a full article body
pub fn expansion_request(title: &str, body: &str) -> LlmRequest {
    let prompt = format!(
        "Expand these notes into a complete article for a design magazine: \"{body}\". Title: {title}"
    );
    LlmRequest::new(prompt, EDITOR_SYSTEM_INSTRUCTION)
}

/// The visitor's text is sent verbatim
pub fn chat_request(text: &str) -> LlmRequest {
    LlmRequest::new(text, ASSISTANT_SYSTEM_INSTRUCTION)
}
