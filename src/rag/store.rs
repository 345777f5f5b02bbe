//! DocStore trait — abstract interface for the vector store.
//!
//! The primary implementation is `SqliteDocStore` in the `sqlite` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// A stored documentation chunk with its citation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk identifier.
    pub chunk_id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Title of the page the chunk came from.
    pub title: String,
    /// URL of the page the chunk came from.
    pub url: String,
    /// Documentation service the page belongs to.
    pub service: String,
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSearchResult {
    pub chunk: StoredChunk,
    /// Similarity score (higher = better).
    pub score: f32,
}

/// Abstract trait for the documentation vector store.
#[async_trait]
pub trait DocStore: Send + Sync {
    /// Insert chunks with their embedding vectors.
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), ApiError>;

    /// Search for chunks similar to the query embedding, optionally
    /// scoped to one service.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        service: Option<&str>,
    ) -> Result<Vec<ChunkSearchResult>, ApiError>;

    /// Delete all chunks for a service. Returns the number removed.
    async fn delete_service(&self, service: &str) -> Result<usize, ApiError>;

    /// Get the chunk count, optionally scoped to one service.
    async fn count(&self, service: Option<&str>) -> Result<usize, ApiError>;

    /// Remove all chunks.
    async fn clear(&self) -> Result<(), ApiError>;
}
