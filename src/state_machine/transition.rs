//! Pure state transition function

use super::state::{Article, ChatMessage, Draft, EditorialState, ExpansionStatus, View};
use super::{DraftEdit, Effect, Event};
use crate::prompts;
use thiserror::Error;

pub const DEFAULT_GUEST_AUTHOR: &str = "Guest";

/// Fixed inputs that shape transitions
#[derive(Debug, Clone)]
pub struct EditorialContext {
    /// Byline for articles published from the editor
    pub guest_author: String,
}

impl Default for EditorialContext {
    fn default() -> Self {
        Self {
            guest_author: DEFAULT_GUEST_AUTHOR.to_string(),
        }
    }
}

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: EditorialState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: EditorialState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Rejections. The state is left untouched whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Draft title is empty")]
    EmptyTitle,
    #[error("Draft body is empty")]
    EmptyBody,
    #[error("Chat message is empty")]
    EmptyMessage,
    #[error("An expansion is already in progress")]
    Busy,
    #[error("No article with id {0}")]
    UnknownArticle(u64),
    #[error("Completion for request {request_id} no longer applies")]
    StaleCompletion { request_id: u64 },
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs; remote calls
/// are requested through effects and answered by later events.
pub fn transition(
    state: &EditorialState,
    context: &EditorialContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    let mut next = state.clone();

    match event {
        // ============================================================
        // Navigation
        // ============================================================
        Event::OpenArticle { id } => {
            if state.article(id).is_none() {
                return Err(TransitionError::UnknownArticle(id));
            }
            next.view = View::Article { id };
            Ok(TransitionResult::new(next))
        }

        Event::GoHome => {
            next.view = View::Home;
            Ok(TransitionResult::new(next))
        }

        Event::OpenEditor => {
            next.view = View::Write;
            Ok(TransitionResult::new(next))
        }

        Event::SetTheme { theme } => {
            next.theme = theme;
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Draft editing and publishing
        // ============================================================
        Event::EditDraft(edit) => {
            apply_edit(&mut next.draft, edit);
            Ok(TransitionResult::new(next))
        }

        Event::CancelDraft => {
            next.draft = Draft::default();
            next.expansion = ExpansionStatus::Idle;
            next.view = View::Home;
            Ok(TransitionResult::new(next))
        }

        Event::PublishDraft { at } => {
            if !state.draft.has_title() {
                return Err(TransitionError::EmptyTitle);
            }
            if !state.draft.has_body() {
                return Err(TransitionError::EmptyBody);
            }

            let draft = std::mem::take(&mut next.draft);
            let id = next.next_article_id;
            next.next_article_id += 1;

            let article = Article {
                id,
                read_time_minutes: super::state::read_time_minutes(&draft.body),
                title: draft.title,
                subtitle: draft.subtitle,
                author: context.guest_author.clone(),
                category: draft.category,
                image_url: draft.image_url,
                body: draft.body,
                published_at: at,
            };

            next.articles.insert(0, article);
            // An expansion still in flight would target the old draft
            next.expansion = ExpansionStatus::Idle;
            next.view = View::Home;

            Ok(TransitionResult::new(next).with_effect(Effect::notify_article_published(id)))
        }

        // ============================================================
        // AI expansion
        // ============================================================
        Event::ExpandDraft => {
            if state.expansion.is_busy() {
                return Err(TransitionError::Busy);
            }
            if !state.draft.has_body() {
                return Err(TransitionError::EmptyBody);
            }

            let request_id = take_request_id(&mut next);
            next.expansion = ExpansionStatus::Busy { request_id };

            let request = prompts::expansion_request(&state.draft.title, &state.draft.body);
            Ok(TransitionResult::new(next).with_effect(Effect::RequestExpansion {
                request_id,
                request,
            }))
        }

        Event::ExpansionComplete { request_id, text } => {
            ensure_current_expansion(state, request_id)?;
            next.draft.body = text;
            next.expansion = ExpansionStatus::Idle;
            Ok(TransitionResult::new(next))
        }

        Event::ExpansionFailed {
            request_id,
            message,
        } => {
            ensure_current_expansion(state, request_id)?;
            let effect = Effect::notify_expansion_failed(&message);
            next.expansion = ExpansionStatus::Failed { message };
            Ok(TransitionResult::new(next).with_effect(effect))
        }

        // ============================================================
        // Chat
        // ============================================================
        Event::SendChatMessage { text } => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyMessage);
            }

            let request_id = take_request_id(&mut next);
            let request = prompts::chat_request(&text);
            next.chat.messages.push(ChatMessage::user(text));
            next.chat.pending_replies += 1;

            Ok(TransitionResult::new(next).with_effect(Effect::RequestChatReply {
                request_id,
                request,
            }))
        }

        Event::ChatReplyReceived { text, .. } => {
            next.chat.messages.push(ChatMessage::assistant(text));
            next.chat.pending_replies = next.chat.pending_replies.saturating_sub(1);
            Ok(TransitionResult::new(next))
        }

        Event::ChatReplyFailed { .. } => {
            next.chat
                .messages
                .push(ChatMessage::assistant(prompts::CHAT_ERROR_MESSAGE));
            next.chat.pending_replies = next.chat.pending_replies.saturating_sub(1);
            Ok(TransitionResult::new(next))
        }
    }
}

// Helper functions

fn apply_edit(draft: &mut Draft, edit: DraftEdit) {
    match edit {
        DraftEdit::Title(title) => draft.title = title,
        DraftEdit::Subtitle(subtitle) => draft.subtitle = subtitle,
        DraftEdit::Category(category) => draft.category = category,
        DraftEdit::Body(body) => draft.body = body,
        DraftEdit::ImageUrl(url) => draft.image_url = url,
    }
}

fn take_request_id(state: &mut EditorialState) -> u64 {
    let id = state.next_request_id;
    state.next_request_id += 1;
    id
}

fn ensure_current_expansion(state: &EditorialState, request_id: u64) -> Result<(), TransitionError> {
    match state.expansion {
        ExpansionStatus::Busy { request_id: current } if current == request_id => Ok(()),
        _ => Err(TransitionError::StaleCompletion { request_id }),
    }
}
