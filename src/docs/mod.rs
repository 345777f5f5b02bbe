//! Documentation acquisition.
//!
//! `DocSource` abstracts where documentation pages come from; the
//! production implementation fetches the official LangChain, LangGraph,
//! and LangSmith docs over HTTP, with bundled sample pages as fallback.

pub mod loader;
pub mod samples;

use async_trait::async_trait;

pub use loader::{service_catalog, DocumentLoader};
pub use samples::sample_documents;

/// The documentation services the assistant knows about.
pub const ALL_SERVICES: [&str; 3] = ["langchain", "langgraph", "langsmith"];

/// One fetched documentation page, ready for chunking.
#[derive(Debug, Clone)]
pub struct DocPage {
    pub content: String,
    pub title: String,
    pub url: String,
    pub service: String,
}

/// A source of documentation pages.
#[async_trait]
pub trait DocSource: Send + Sync {
    /// Load the pages for the given services. Pages that cannot be
    /// loaded are skipped; a completely empty result signals the caller
    /// to fall back to samples.
    async fn load_documents(&self, services: &[String]) -> Vec<DocPage>;
}

pub fn all_services() -> Vec<String> {
    ALL_SERVICES.iter().map(|s| s.to_string()).collect()
}
