use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, health};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health))
        .route("/api/chat", post(chat::chat))
        .route("/api/index", post(chat::index_documents))
        .route("/api/sources", get(chat::list_sources))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

// The API serves browser frontends from arbitrary origins.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
