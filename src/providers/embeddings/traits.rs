//! Embedding provider trait and supporting types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::EmbeddingVector;

/// Errors that can occur while generating embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),
}

/// Result type for embedding operations.
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// How the embedded text will be used.
///
/// Asymmetric models such as e5 embed queries and passages differently;
/// indexed articles are passages, press releases used for lookup are queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Query,
    Passage,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Query => "query",
            InputType::Passage => "passage",
        }
    }
}

/// Trait for text embedding services.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the provider's name (e.g., "pinecone").
    fn name(&self) -> &str;

    /// Returns the model identifier being used.
    fn model(&self) -> &str;

    /// Embeds a batch of texts, returning one vector per input in input order.
    async fn embed(
        &self,
        texts: &[String],
        input_type: InputType,
    ) -> EmbeddingResult<Vec<EmbeddingVector>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_type_serialization() {
        assert_eq!(serde_json::to_string(&InputType::Query).unwrap(), "\"query\"");
        assert_eq!(
            serde_json::to_string(&InputType::Passage).unwrap(),
            "\"passage\""
        );
        assert_eq!(InputType::Passage.as_str(), "passage");
    }
}
