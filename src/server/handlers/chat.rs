use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::core::errors::ApiError;
use crate::docs::{service_catalog, ALL_SERVICES};
use crate::schemas::{
    ChatRequest, ChatResponse, IndexResponse, SourcesResponse, MAX_QUESTION_CHARS,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IndexParams {
    /// Comma-separated list of services to re-index.
    pub services: Option<String>,
}

/// Submit a question and get an answer with source citations.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let question = payload.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }
    if payload.question.chars().count() > MAX_QUESTION_CHARS {
        return Err(ApiError::BadRequest(format!(
            "question exceeds {MAX_QUESTION_CHARS} characters"
        )));
    }

    let (answer, sources, processing_time) = state
        .rag
        .query(question, payload.service_filter)
        .await
        .map_err(|err| {
            tracing::error!("Error processing chat request: {}", err);
            match err {
                ApiError::Internal(msg) => {
                    ApiError::Internal(format!("Failed to process question: {msg}"))
                }
                other => other,
            }
        })?;

    Ok(Json(ChatResponse {
        answer,
        sources,
        processing_time: (processing_time * 100.0).round() / 100.0,
    }))
}

/// Trigger re-indexing of documentation, optionally for specific services.
pub async fn index_documents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, ApiError> {
    let services = parse_services(params.services.as_deref())?;

    let (documents_indexed, services_indexed) =
        state.rag.index_documents(services).await.map_err(|err| {
            tracing::error!("Error indexing documents: {}", err);
            match err {
                ApiError::Internal(msg) => {
                    ApiError::Internal(format!("Failed to index documents: {msg}"))
                }
                other => other,
            }
        })?;

    Ok(Json(IndexResponse {
        success: true,
        documents_indexed,
        services_indexed,
        message: format!("Successfully indexed {documents_indexed} document chunks"),
    }))
}

/// List the available documentation sources.
pub async fn list_sources() -> impl IntoResponse {
    Json(SourcesResponse {
        sources: service_catalog(),
    })
}

fn parse_services(raw: Option<&str>) -> Result<Option<Vec<String>>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let mut services = Vec::new();
    for name in raw.split(',') {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        if !ALL_SERVICES.contains(&name.as_str()) {
            return Err(ApiError::BadRequest(format!("unknown service: {name}")));
        }
        if !services.contains(&name) {
            services.push(name);
        }
    }

    if services.is_empty() {
        return Ok(None);
    }
    Ok(Some(services))
}
