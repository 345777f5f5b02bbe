//! Integration tests for the HTTP API.
//!
//! Each test builds an isolated app with a temp-file vector store, a
//! deterministic mock LLM provider, and the bundled sample docs as the
//! documentation source, then drives the router with `oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use docqa::core::config::{AppPaths, Settings};
use docqa::core::errors::ApiError;
use docqa::docs::{sample_documents, DocPage, DocSource};
use docqa::llm::{CompletionRequest, LlmProvider};
use docqa::rag::{RagService, SqliteDocStore};
use docqa::server::router::router;
use docqa::state::AppState;

// =============================================================================
// Test doubles
// =============================================================================

/// Serves the bundled sample docs without touching the network.
struct SampleSource;

#[async_trait]
impl DocSource for SampleSource {
    async fn load_documents(&self, services: &[String]) -> Vec<DocPage> {
        sample_documents(services)
    }
}

const VOCAB: [&str; 12] = [
    "chain",
    "lcel",
    "langchain",
    "graph",
    "node",
    "langgraph",
    "trace",
    "evaluation",
    "langsmith",
    "rag",
    "retrieval",
    "memory",
];

/// Keyword-count embedding, deterministic and cheap.
fn embed_text(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut vector: Vec<f32> = VOCAB
        .iter()
        .map(|word| lower.matches(word).count() as f32)
        .collect();
    vector.push(1.0);
    vector
}

struct MockProvider;

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(true)
    }

    async fn chat(&self, _request: CompletionRequest, _model_id: &str) -> Result<String, ApiError> {
        Ok("To create a chain, compose a prompt with a model using LCEL.".to_string())
    }

    async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(inputs.iter().map(|text| embed_text(text)).collect())
    }
}

/// Embeds fine but fails every chat completion.
struct FailingChatProvider;

#[async_trait]
impl LlmProvider for FailingChatProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(false)
    }

    async fn chat(&self, _request: CompletionRequest, _model_id: &str) -> Result<String, ApiError> {
        Err(ApiError::Internal("chat completion error: boom".to_string()))
    }

    async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(inputs.iter().map(|text| embed_text(text)).collect())
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn make_app(provider: Arc<dyn LlmProvider>) -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let paths = Arc::new(AppPaths::at(dir.path().join("data")));
    let settings = Settings::default();

    let store = Arc::new(
        SqliteDocStore::with_path(dir.path().join("index.db"))
            .await
            .unwrap(),
    );
    let rag = Arc::new(RagService::new(
        settings.clone(),
        provider,
        store,
        Arc::new(SampleSource),
    ));

    let state = AppState::from_parts(paths, settings, rag);
    (router(state), dir)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Root and health
// =============================================================================

#[tokio::test]
async fn root_lists_the_api_endpoints() {
    let (app, _dir) = make_app(Arc::new(MockProvider)).await;

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["endpoints"]["chat"], "POST /api/chat");
    assert_eq!(body["endpoints"]["health"], "GET /api/health");
}

#[tokio::test]
async fn health_reports_unready_before_anything_is_indexed() {
    let (app, _dir) = make_app(Arc::new(MockProvider)).await;

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["vector_store_ready"], false);
    assert_eq!(body["indexed_documents"], 0);
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn chat_answers_with_at_least_one_cited_source() {
    let (app, _dir) = make_app(Arc::new(MockProvider)).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/chat",
            r#"{"question": "How do I create a chain in LangChain?", "service_filter": "all"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(!body["answer"].as_str().unwrap().is_empty());
    assert!(body["processing_time"].as_f64().unwrap() >= 0.0);

    let sources = body["sources"].as_array().unwrap();
    assert!(!sources.is_empty());
    assert!(sources.len() <= 5);
    for source in sources {
        assert!(!source["title"].as_str().unwrap().is_empty());
        assert!(!source["url"].as_str().unwrap().is_empty());
    }

    // the lazy initialization performed by the first query is now visible
    let health = body_json(app.oneshot(get("/api/health")).await.unwrap()).await;
    assert_eq!(health["vector_store_ready"], true);
    assert!(health["indexed_documents"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn chat_scopes_sources_to_the_filtered_service() {
    let (app, _dir) = make_app(Arc::new(MockProvider)).await;

    let response = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"question": "What is a StateGraph?", "service_filter": "langgraph"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let sources = body["sources"].as_array().unwrap();
    assert!(!sources.is_empty());
    for source in sources {
        assert_eq!(source["service"], "langgraph");
    }
}

#[tokio::test]
async fn chat_rejects_empty_and_whitespace_questions() {
    let (app, _dir) = make_app(Arc::new(MockProvider)).await;

    for payload in [r#"{"question": ""}"#, r#"{"question": "   \n"}"#] {
        let response = app
            .clone()
            .oneshot(post_json("/api/chat", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("empty"));
    }
}

#[tokio::test]
async fn chat_rejects_overlong_questions() {
    let (app, _dir) = make_app(Arc::new(MockProvider)).await;

    let question = "x".repeat(2001);
    let payload = format!(r#"{{"question": "{question}"}}"#);

    let response = app.oneshot(post_json("/api/chat", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("2000"));
}

#[tokio::test]
async fn chat_rejects_unknown_filter_values() {
    let (app, _dir) = make_app(Arc::new(MockProvider)).await;

    let response = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"question": "hi", "service_filter": "chroma"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn chat_surfaces_provider_failures_in_the_detail_field() {
    let (app, _dir) = make_app(Arc::new(FailingChatProvider)).await;

    let response = app
        .oneshot(post_json(
            "/api/chat",
            r#"{"question": "How do I create a chain in LangChain?"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Failed to process question:"));
    assert!(detail.contains("boom"));
}

// =============================================================================
// Indexing
// =============================================================================

#[tokio::test]
async fn index_covers_all_services_by_default() {
    let (app, _dir) = make_app(Arc::new(MockProvider)).await;

    let response = app.clone().oneshot(post_empty("/api/index")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["documents_indexed"].as_u64().unwrap() > 0);
    assert_eq!(
        body["services_indexed"],
        serde_json::json!(["langchain", "langgraph", "langsmith"])
    );
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Successfully indexed"));
}

#[tokio::test]
async fn index_can_be_scoped_to_one_service() {
    let (app, _dir) = make_app(Arc::new(MockProvider)).await;

    let response = app
        .clone()
        .oneshot(post_empty("/api/index?services=langsmith"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let indexed = body["documents_indexed"].as_u64().unwrap();
    assert!(indexed > 0);
    assert_eq!(body["services_indexed"], serde_json::json!(["langsmith"]));

    let health = body_json(app.oneshot(get("/api/health")).await.unwrap()).await;
    assert_eq!(health["indexed_documents"].as_u64().unwrap(), indexed);
}

#[tokio::test]
async fn reindexing_does_not_duplicate_chunks() {
    let (app, _dir) = make_app(Arc::new(MockProvider)).await;

    let first = body_json(app.clone().oneshot(post_empty("/api/index")).await.unwrap()).await;
    let second = body_json(app.clone().oneshot(post_empty("/api/index")).await.unwrap()).await;
    assert_eq!(first["documents_indexed"], second["documents_indexed"]);

    let health = body_json(app.oneshot(get("/api/health")).await.unwrap()).await;
    assert_eq!(
        health["indexed_documents"].as_u64().unwrap(),
        second["documents_indexed"].as_u64().unwrap()
    );
}

#[tokio::test]
async fn index_rejects_unknown_services() {
    let (app, _dir) = make_app(Arc::new(MockProvider)).await;

    let response = app
        .oneshot(post_empty("/api/index?services=chroma"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("chroma"));
}

// =============================================================================
// Sources catalog
// =============================================================================

#[tokio::test]
async fn sources_lists_the_three_documentation_services() {
    let (app, _dir) = make_app(Arc::new(MockProvider)).await;

    let response = app.oneshot(get("/api/sources")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let sources = body["sources"].as_array().unwrap();
    let ids: Vec<&str> = sources
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["langchain", "langgraph", "langsmith"]);
    for source in sources {
        assert!(!source["name"].as_str().unwrap().is_empty());
        assert!(source["docs_url"].as_str().unwrap().starts_with("https://"));
    }
}
