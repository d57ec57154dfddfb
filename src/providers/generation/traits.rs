//! Text generation trait and supporting types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during text generation.
#[derive(Debug, Error)]
pub enum GenerationError {
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

    #[error("Provider not available: {0}")]
    Unavailable(String),
}

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Request for a single prompt completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Full prompt text.
    pub prompt: String,

    /// Sampling temperature (0.0 to 2.0). `None` leaves the provider's
    /// own default in effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

}

/// Token usage statistics from a completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt.
    pub prompt_tokens: usize,

    /// Number of tokens in the completion.
    pub completion_tokens: usize,

    /// Total tokens used.
    pub total_tokens: usize,
}

/// Reason why a completion finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of generation.
    Stop,

    /// Hit the max_tokens limit.
    Length,

    /// Content was filtered for safety.
    ContentFilter,

    /// Unknown or provider-specific reason.
    #[serde(other)]
    Other,
}

/// Response from a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text content, untrimmed.
    pub text: String,

    /// Token usage statistics.
    pub tokens_used: TokenUsage,

    /// Why generation finished.
    pub finish_reason: FinishReason,
}

/// Trait for text generation services (OpenAI completions, Ollama, etc.).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the provider's name (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Returns the model identifier being used.
    fn model(&self) -> &str;

    /// Completes a prompt and returns the full response.
    async fn complete(&self, request: &CompletionRequest) -> GenerationResult<CompletionResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("Explain")
            .with_temperature(0.5)
            .with_max_tokens(100);

        assert_eq!(request.prompt, "Explain");
        assert_eq!(request.temperature, Some(0.5));
        assert_eq!(request.max_tokens, Some(100));
    }

    #[test]
    fn test_completion_request_defaults() {
        let request: CompletionRequest = serde_json::from_str(r#"{"prompt": "hi"}"#).unwrap();
        assert!(request.temperature.is_none());
        assert!(request.max_tokens.is_none());
    }

    #[test]
    fn test_finish_reason_deserialization() {
        let stop: FinishReason = serde_json::from_str("\"stop\"").unwrap();
        assert_eq!(stop, FinishReason::Stop);

        let length: FinishReason = serde_json::from_str("\"length\"").unwrap();
        assert_eq!(length, FinishReason::Length);

        // Unknown reasons should map to Other
        let unknown: FinishReason = serde_json::from_str("\"something_else\"").unwrap();
        assert_eq!(unknown, FinishReason::Other);
    }

    #[test]
    fn test_token_usage_default() {
        let usage = TokenUsage::default();
        assert_eq!(usage.prompt_tokens, 0);
        assert_eq!(usage.completion_tokens, 0);
        assert_eq!(usage.total_tokens, 0);
    }
}
