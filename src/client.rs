//! Typed HTTP client for the backend API.
//!
//! Pure request/response mapping over the four backend operations:
//! no retry, no caching, no batching. Every call shares one fixed
//! timeout; a timeout surfaces as a plain transport failure.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::schemas::{
    ChatRequest, ChatResponse, HealthResponse, ServiceFilter, ServiceInfo, SourcesResponse,
};

/// Fixed timeout applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error surfaced by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with an error. The message is taken from the
    /// response body's `detail` field when present.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// The backend could not be reached (connection failure or timeout).
    #[error("{message}")]
    Network { message: String },

    /// The backend answered but the payload could not be decoded.
    #[error("failed to decode response: {message}")]
    Decode { message: String },
}

impl ClientError {
    pub fn is_backend_error(&self) -> bool {
        matches!(self, ClientError::Backend { .. })
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, ClientError::Network { .. })
    }
}

/// HTTP client for the documentation assistant backend.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("docqa/{VERSION}"))
                .unwrap_or_else(|_| HeaderValue::from_static("docqa")),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a question, optionally scoped to one documentation service.
    pub async fn send_chat_message(
        &self,
        question: &str,
        service_filter: ServiceFilter,
    ) -> Result<ChatResponse, ClientError> {
        let body = ChatRequest {
            question: question.to_string(),
            service_filter,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        decode(response).await
    }

    /// Fetch readiness status and indexed document count.
    pub async fn check_health(&self) -> Result<HealthResponse, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .map_err(|_| ClientError::Network {
                message: "backend unavailable".to_string(),
            })?;

        decode(response).await
    }

    /// List the documentation services the backend knows about.
    pub async fn get_sources(&self) -> Result<Vec<ServiceInfo>, ClientError> {
        let response = self
            .client
            .get(format!("{}/api/sources", self.base_url))
            .send()
            .await
            .map_err(network_error)?;

        let payload: SourcesResponse = decode(response).await?;
        Ok(payload.sources)
    }

    /// Trigger re-indexing. Fire-and-forget: the response payload is
    /// discarded, only failure is surfaced.
    pub async fn reindex_documents(&self, services: Option<&[String]>) -> Result<(), ClientError> {
        let mut request = self.client.post(format!("{}/api/index", self.base_url));
        if let Some(services) = services {
            request = request.query(&[("services", services.join(","))]);
        }

        let response = request.send().await.map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(backend_error(status, &body));
        }

        Ok(())
    }
}

fn network_error(err: reqwest::Error) -> ClientError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        "could not reach the backend".to_string()
    };
    ClientError::Network { message }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(backend_error(status, &body));
    }

    response.json().await.map_err(|err| ClientError::Decode {
        message: err.to_string(),
    })
}

/// Map an error response to a `ClientError::Backend`, preferring the
/// body's `detail` message.
fn backend_error(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(|detail| detail.as_str())
                .map(|detail| detail.to_string())
        })
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

    ClientError::Backend {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3005/");
        assert_eq!(client.base_url(), "http://localhost:3005");
    }

    #[test]
    fn backend_error_prefers_the_detail_message() {
        let err = backend_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "Failed to process question: boom"}"#,
        );
        match err {
            ClientError::Backend { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Failed to process question: boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn backend_error_falls_back_to_a_generic_message() {
        let err = backend_error(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        match err {
            ClientError::Backend { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "request failed with status 502");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let empty = backend_error(StatusCode::NOT_FOUND, "");
        assert!(matches!(empty, ClientError::Backend { status: 404, .. }));
    }
}
