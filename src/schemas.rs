//! Request and response schemas for the HTTP API.
//!
//! Shared between the server handlers and the typed client, so the wire
//! contract lives in exactly one place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum accepted question length, in characters.
pub const MAX_QUESTION_CHARS: usize = 2000;

/// Documentation services a question can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceFilter {
    #[default]
    All,
    Langchain,
    Langgraph,
    Langsmith,
}

impl ServiceFilter {
    /// The service id this filter scopes retrieval to, or `None` for `All`.
    pub fn service_id(self) -> Option<&'static str> {
        match self {
            ServiceFilter::All => None,
            ServiceFilter::Langchain => Some("langchain"),
            ServiceFilter::Langgraph => Some("langgraph"),
            ServiceFilter::Langsmith => Some("langsmith"),
        }
    }
}

impl fmt::Display for ServiceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_id().unwrap_or("all"))
    }
}

impl FromStr for ServiceFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "all" => Ok(ServiceFilter::All),
            "langchain" => Ok(ServiceFilter::Langchain),
            "langgraph" => Ok(ServiceFilter::Langgraph),
            "langsmith" => Ok(ServiceFilter::Langsmith),
            other => Err(format!(
                "unknown service filter '{other}' (expected all, langchain, langgraph, or langsmith)"
            )),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub service_filter: ServiceFilter,
}

/// A documentation snippet cited alongside an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    pub content_preview: String,
    pub service: String,
}

/// Body of a successful `POST /api/chat` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Seconds spent processing the request, rounded to two decimals.
    pub processing_time: f64,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub vector_store_ready: bool,
    pub indexed_documents: usize,
}

/// Body of `POST /api/index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub success: bool,
    pub documents_indexed: usize,
    pub services_indexed: Vec<String>,
    pub message: String,
}

/// One entry of the documentation source catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub id: String,
    pub description: String,
    pub docs_url: String,
}

/// Body of `GET /api/sources`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesResponse {
    pub sources: Vec<ServiceInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_filter_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ServiceFilter::Langgraph).unwrap(),
            "\"langgraph\""
        );
        let parsed: ServiceFilter = serde_json::from_str("\"langsmith\"").unwrap();
        assert_eq!(parsed, ServiceFilter::Langsmith);
    }

    #[test]
    fn chat_request_filter_defaults_to_all() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"question": "What is a chain?"}"#).unwrap();
        assert_eq!(request.service_filter, ServiceFilter::All);
        assert_eq!(request.question, "What is a chain?");
    }

    #[test]
    fn service_filter_parses_from_str() {
        assert_eq!("ALL".parse::<ServiceFilter>().unwrap(), ServiceFilter::All);
        assert_eq!(
            " langchain ".parse::<ServiceFilter>().unwrap(),
            ServiceFilter::Langchain
        );
        assert!("chroma".parse::<ServiceFilter>().is_err());
    }
}
