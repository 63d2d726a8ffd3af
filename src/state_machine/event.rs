//! Events that can occur in the magazine

use super::state::{Category, Theme};
use chrono::{DateTime, Utc};

/// A change to one field of the draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEdit {
    Title(String),
    Subtitle(String),
    Category(Category),
    Body(String),
    ImageUrl(String),
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // Navigation
    OpenArticle {
        id: u64,
    },
    GoHome,
    OpenEditor,
    SetTheme {
        theme: Theme,
    },

    // Draft
    EditDraft(DraftEdit),
    CancelDraft,
    PublishDraft {
        at: DateTime<Utc>,
    },
    ExpandDraft,
    ExpansionComplete {
        request_id: u64,
        text: String,
    },
    ExpansionFailed {
        request_id: u64,
        message: String,
    },

    // Chat
    SendChatMessage {
        text: String,
    },
    ChatReplyReceived {
        request_id: u64,
        text: String,
    },
    ChatReplyFailed {
        request_id: u64,
        message: String,
    },
}

impl Event {
    /// Completions come from the runtime, not from a visitor
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Event::ExpansionComplete { .. }
                | Event::ExpansionFailed { .. }
                | Event::ChatReplyReceived { .. }
                | Event::ChatReplyFailed { .. }
        )
    }
}
