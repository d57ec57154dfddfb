//! Vector index trait.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{EmbeddingVector, SearchMatch, VectorRecord};

/// Errors that can occur when talking to a vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Dimension mismatch: index holds {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid index configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Trait for nearest-neighbor vector indexes.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns the backend name (e.g., "pinecone", "memory").
    fn name(&self) -> &str;

    /// Returns up to `top_k` matches, highest similarity first, with metadata.
    async fn query(&self, vector: &EmbeddingVector, top_k: usize)
        -> IndexResult<Vec<SearchMatch>>;

    /// Inserts or replaces records, returning how many were written.
    async fn upsert(&self, records: &[VectorRecord]) -> IndexResult<usize>;
}
