use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::schemas::HealthResponse;
use crate::state::AppState;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Documentation QA Assistant API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Ask questions about LangChain, LangGraph, and LangSmith",
        "endpoints": {
            "chat": "POST /api/chat",
            "health": "GET /api/health",
            "index": "POST /api/index",
            "sources": "GET /api/sources"
        }
    }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        vector_store_ready: state.rag.is_initialized(),
        indexed_documents: state.rag.document_count().await,
    })
}
