//! Editorial state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cover used for new drafts until the author picks another
pub const DEFAULT_COVER_IMAGE: &str =
    "https://images.unsplash.com/photo-1451187580459-43490279c0fa?q=80&w=1000&auto=format&fit=crop";

/// Characters per minute of reading
pub const READ_SPEED_CHARS_PER_MINUTE: usize = 500;

/// Estimated reading time: `ceil(chars / 500)` minutes, so an empty body is 0
pub fn read_time_minutes(body: &str) -> u32 {
    let chars = body.chars().count();
    u32::try_from(chars.div_ceil(READ_SPEED_CHARS_PER_MINUTE)).unwrap_or(u32::MAX)
}

// ============================================================================
// Content
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Design,
    Tech,
    Culture,
    Future,
}

/// A published article. Never modified after publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub read_time_minutes: u32,
    pub category: Category,
    pub image_url: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
}

/// The single in-progress article
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draft {
    pub title: String,
    pub subtitle: String,
    pub category: Category,
    pub body: String,
    pub image_url: String,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            category: Category::default(),
            body: String::new(),
            image_url: DEFAULT_COVER_IMAGE.to_string(),
        }
    }
}

impl Draft {
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// Append-only transcript for the lifetime of the process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatSession {
    pub messages: Vec<ChatMessage>,
    /// Replies requested but not yet received
    pub pending_replies: u32,
}

// ============================================================================
// Presentation state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum View {
    #[default]
    Home,
    Article {
        id: u64,
    },
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    Neon,
}

/// Progress of the "expand draft with AI" action
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExpansionStatus {
    #[default]
    Idle,
    Busy {
        request_id: u64,
    },
    /// Last attempt failed; a new expansion may be requested
    Failed {
        message: String,
    },
}

impl ExpansionStatus {
    pub fn is_busy(&self) -> bool {
        matches!(self, ExpansionStatus::Busy { .. })
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Everything the magazine holds in memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorialState {
    pub view: View,
    pub theme: Theme,
    /// Read order: most recently published first
    pub articles: Vec<Article>,
    pub draft: Draft,
    pub expansion: ExpansionStatus,
    pub chat: ChatSession,
    #[serde(skip)]
    pub(super) next_article_id: u64,
    #[serde(skip)]
    pub(super) next_request_id: u64,
}

impl Default for EditorialState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorialState {
    pub fn new() -> Self {
        Self {
            view: View::default(),
            theme: Theme::default(),
            articles: Vec::new(),
            draft: Draft::default(),
            expansion: ExpansionStatus::default(),
            chat: ChatSession::default(),
            next_article_id: 1,
            next_request_id: 1,
        }
    }

    /// State with the two launch articles, stamped `published_at`
    ///
    /// Their read times are editorial estimates of the full pieces, not
    /// derived from the excerpt bodies kept here.
    pub fn seeded(published_at: DateTime<Utc>) -> Self {
        let seeds = [
            (
                Category::Design,
                4,
                "The Aesthetics of Digital Silence",
                "Why minimalism is not only visual, but mental.",
                "Elena V.",
                "https://images.unsplash.com/photo-1449247709967-d4461a6a6103?q=80&w=1000&auto=format&fit=crop",
                "In an era of constant noise, silence has become the ultimate luxury. We are not only talking about the absence of sound, but the absence of input. Modern design is moving towards interfaces that do not shout, but whisper.",
            ),
            (
                Category::Tech,
                6,
                "Neuro-Architecture",
                "How virtual spaces shape our thoughts.",
                "Marco D.",
                "https://images.unsplash.com/photo-1518640467707-6811f4a6ab73?q=80&w=1000&auto=format&fit=crop",
                "Gothic cathedrals were designed to lift the spirit. Social media is designed to capture attention. What happens when we apply the principles of sacred architecture to web design?",
            ),
        ];

        let mut state = Self::new();
        for (category, read_time, title, subtitle, author, image_url, body) in seeds.into_iter().rev() {
            let article = Article {
                id: state.next_article_id,
                title: title.to_string(),
                subtitle: subtitle.to_string(),
                author: author.to_string(),
                read_time_minutes: read_time,
                category,
                image_url: image_url.to_string(),
                body: body.to_string(),
                published_at,
            };
            state.next_article_id += 1;
            // Seeds are listed in read order, so publish them last to first
            state.articles.insert(0, article);
        }
        state
    }

    pub fn article(&self, id: u64) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    #[cfg(test)]
    pub fn next_article_id(&self) -> u64 {
        self.next_article_id
    }
}
