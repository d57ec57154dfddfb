//! Errors surfaced by the ranking pipeline.

use std::time::Duration;

use thiserror::Error;

use crate::providers::generation::GenerationError;
use crate::storage::DatabaseError;

/// Errors that can occur while ranking journalists.
///
/// Every stage propagates its failure unchanged; callers receive either a
/// complete journalist list or exactly one of these.
#[derive(Debug, Error)]
pub enum RankingError {
    /// Malformed or empty caller input. Never worth retrying.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The embedding service failed, timed out or returned unusable vectors.
    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The vector index is unreachable or answered with malformed data.
    /// Safe to retry the whole ranking call.
    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    /// A journalist's motivation could not be generated.
    #[error("Generation failed for {email}: {source}")]
    GenerationFailure {
        email: String,
        #[source]
        source: GenerationError,
    },

    /// A journalist's motivation did not arrive in time.
    #[error("Generation timed out for {email} after {timeout:?}")]
    GenerationTimeout { email: String, timeout: Duration },

    /// The document store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

impl RankingError {
    /// Whether retrying the whole ranking call might succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RankingError::InvalidInput(_))
    }
}

/// Result type for ranking operations.
pub type RankingResult<T> = std::result::Result<T, RankingError>;
