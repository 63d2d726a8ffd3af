//! API request and response types

use crate::state_machine::state::{Article, Category, ChatMessage, Theme};
use crate::state_machine::DraftEdit;
use serde::{Deserialize, Serialize};

/// Partial update of the draft; absent fields are left alone
#[derive(Debug, Default, Deserialize)]
pub struct DraftPatch {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub category: Option<Category>,
    pub body: Option<String>,
    pub image_url: Option<String>,
}

impl DraftPatch {
    /// Edits in a fixed field order
    pub fn into_edits(self) -> Vec<DraftEdit> {
        let mut edits = Vec::new();
        if let Some(title) = self.title {
            edits.push(DraftEdit::Title(title));
        }
        if let Some(subtitle) = self.subtitle {
            edits.push(DraftEdit::Subtitle(subtitle));
        }
        if let Some(category) = self.category {
            edits.push(DraftEdit::Category(category));
        }
        if let Some(body) = self.body {
            edits.push(DraftEdit::Body(body));
        }
        if let Some(image_url) = self.image_url {
            edits.push(DraftEdit::ImageUrl(image_url));
        }
        edits
    }
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

/// Response with the articles in read order
#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<Article>,
}

/// Response with a single article
#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub article: Article,
}

#[derive(Debug, Serialize)]
pub struct ChatTranscriptResponse {
    pub messages: Vec<ChatMessage>,
    pub pending_replies: u32,
}

/// Response for actions whose result arrives later over the stream
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub accepted: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
