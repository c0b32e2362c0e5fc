//! # relay_api
//!
//! HTTP API library for Relay.

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::http::{Method, StatusCode, header};
use axum::routing::post;
use relay_core::completion::CompletionProvider;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::chat;

/// Route paths.
pub mod routes {
    pub const POST_API_CHAT: &str = "/api/chat";
}

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool, shared by every request.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Completion backend.
    pub completion: Arc<dyn CompletionProvider>,
}

/// Builds the Axum router with all routes and shared state.
///
/// Every `OPTIONS` request is answered by the CORS layer with `200` and an
/// empty body before routing. Unknown method/path combinations get an empty
/// `404`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            routes::POST_API_CHAT,
            post(chat::chat_handler).fallback(not_found),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
