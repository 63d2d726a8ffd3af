//! Flux Journal - an AI-assisted design magazine
//!
//! A Rust backend implementing the editorial state machine and a
//! retrying client for remote text generation.

mod api;
mod llm;
mod prompts;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use llm::{GeminiService, LlmConfig, LoggingService, RetryingService};
use runtime::EditorialRuntime;
use state_machine::{EditorialContext, EditorialState};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flux_journal=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let port: u16 = std::env::var("FLUX_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let llm_config = LlmConfig::from_env();
    if llm_config.api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; requests are sent without a key");
    }

    // Single-shot provider, logged, then retried
    let gemini = GeminiService::new(&llm_config)?;
    let logged = LoggingService::new(Arc::new(gemini));
    let client = RetryingService::new(Arc::new(logged), llm_config.retry);
    tracing::info!(
        model = %client.model_id(),
        max_attempts = llm_config.retry.max_attempts,
        base_delay_ms = %llm_config.retry.base_delay.as_millis(),
        "Text generation client initialized"
    );

    let runtime = EditorialRuntime::spawn(
        EditorialContext::default(),
        EditorialState::seeded(chrono::Utc::now()),
        client,
    );

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(AppState::new(runtime))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Flux Journal server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
