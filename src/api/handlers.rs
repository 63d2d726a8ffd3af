//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    AcceptedResponse, ArticleListResponse, ArticleResponse, ChatRequest, ChatTranscriptResponse,
    DraftPatch, ErrorResponse, ThemeRequest,
};
use super::AppState;
use crate::runtime::{DispatchError, SseEvent};
use crate::state_machine::{EditorialState, Event, TransitionError};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Snapshots
        .route("/api/state", get(get_state))
        .route("/api/articles", get(list_articles))
        .route("/api/articles/:id", get(get_article))
        // Navigation
        .route("/api/articles/:id/open", post(open_article))
        .route("/api/home", post(go_home))
        .route("/api/theme", put(set_theme))
        // Draft
        .route("/api/draft", patch(edit_draft))
        .route("/api/draft/open", post(open_editor))
        .route("/api/draft/publish", post(publish_draft))
        .route("/api/draft/cancel", post(cancel_draft))
        .route("/api/draft/expand", post(expand_draft))
        // Chat
        .route("/api/chat", get(get_chat).post(send_chat))
        // SSE streaming
        .route("/api/stream", get(stream_events))
        .with_state(state)
}

// ============================================================
// Snapshots
// ============================================================

async fn get_state(State(state): State<AppState>) -> Json<EditorialState> {
    Json(state.runtime.snapshot())
}

async fn list_articles(State(state): State<AppState>) -> Json<ArticleListResponse> {
    Json(ArticleListResponse {
        articles: state.runtime.snapshot().articles,
    })
}

async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ArticleResponse>, AppError> {
    let article = state
        .runtime
        .snapshot()
        .article(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("No article with id {id}")))?;
    Ok(Json(ArticleResponse { article }))
}

// ============================================================
// Navigation
// ============================================================

async fn open_article(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<EditorialState>, AppError> {
    apply(&state, Event::OpenArticle { id }).await
}

async fn go_home(State(state): State<AppState>) -> Result<Json<EditorialState>, AppError> {
    apply(&state, Event::GoHome).await
}

async fn set_theme(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ThemeRequest>,
) -> Result<Json<EditorialState>, AppError> {
    apply(&state, Event::SetTheme { theme: req.theme }).await
}

// ============================================================
// Draft
// ============================================================

async fn open_editor(State(state): State<AppState>) -> Result<Json<EditorialState>, AppError> {
    apply(&state, Event::OpenEditor).await
}

async fn edit_draft(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DraftPatch>,
) -> Result<Json<EditorialState>, AppError> {
    for edit in req.into_edits() {
        state.runtime.dispatch(Event::EditDraft(edit)).await?;
    }
    Ok(Json(state.runtime.snapshot()))
}

async fn publish_draft(State(state): State<AppState>) -> Result<Json<EditorialState>, AppError> {
    apply(&state, Event::PublishDraft { at: Utc::now() }).await
}

async fn cancel_draft(State(state): State<AppState>) -> Result<Json<EditorialState>, AppError> {
    apply(&state, Event::CancelDraft).await
}

async fn expand_draft(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.runtime.dispatch(Event::ExpandDraft).await?;
    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true })))
}

// ============================================================
// Chat
// ============================================================

async fn get_chat(State(state): State<AppState>) -> Json<ChatTranscriptResponse> {
    let chat = state.runtime.snapshot().chat;
    Json(ChatTranscriptResponse {
        messages: chat.messages,
        pending_replies: chat.pending_replies,
    })
}

async fn send_chat(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .runtime
        .dispatch(Event::SendChatMessage { text: req.text })
        .await?;
    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true })))
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_events(State(state): State<AppState>) -> impl IntoResponse {
    // Subscribe first so no change slips between snapshot and stream
    let broadcast_rx = state.runtime.subscribe();
    let snapshot = serde_json::to_value(state.runtime.snapshot()).unwrap_or(Value::Null);
    sse_stream(SseEvent::Init { state: snapshot }, broadcast_rx)
}

// ============================================================
// Helpers
// ============================================================

async fn apply(state: &AppState, event: Event) -> Result<Json<EditorialState>, AppError> {
    state.runtime.dispatch(event).await?;
    Ok(Json(state.runtime.snapshot()))
}

// ============================================================
// Error Handling
// ============================================================

/// JSON body extractor whose rejections render as [`ErrorResponse`]
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
struct ApiJson<T>(T);

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unavailable(String),
    InvalidBody(StatusCode, String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.status(), rejection.body_text())
    }
}

impl From<DispatchError> for AppError {
    fn from(error: DispatchError) -> Self {
        let message = error.to_string();
        match error {
            DispatchError::Rejected(
                TransitionError::EmptyTitle
                | TransitionError::EmptyBody
                | TransitionError::EmptyMessage,
            ) => AppError::BadRequest(message),
            DispatchError::Rejected(TransitionError::UnknownArticle(_)) => {
                AppError::NotFound(message)
            }
            DispatchError::Rejected(
                TransitionError::Busy | TransitionError::StaleCompletion { .. },
            ) => AppError::Conflict(message),
            DispatchError::Stopped => AppError::Unavailable(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::InvalidBody(status, msg) => (status, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
