//! API route handlers.

mod health;
mod hooks;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::types::ApiState;

/// Create the API router with all endpoints, without the `/api` prefix.
pub fn create_api_router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health::health_handler))
        // Hooks
        .route("/hooks/command", post(hooks::command_handler))
        .route("/question", post(hooks::question_handler))
        // Request tracing (enable with RUST_LOG=tower_http=info or higher)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Create the full application router, mounted under `/api`.
pub fn create_app(state: Arc<ApiState>) -> Router {
    Router::new().nest("/api", create_api_router(state))
}
