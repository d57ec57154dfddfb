//! Ollama provider implementation.
//!
//! Ollama exposes an OpenAI-compatible `/v1/completions` route, so this is a
//! thin wrapper around [`OpenAiCompletions`] with Ollama-specific defaults.

use async_trait::async_trait;

use super::openai::OpenAiCompletions;
use super::traits::{CompletionRequest, CompletionResponse, GenerationResult, TextGenerator};

/// Default Ollama API URL.
pub const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434/v1";

/// Generator backed by a local Ollama server.
pub struct OllamaGenerator {
    inner: OpenAiCompletions,
}

impl OllamaGenerator {
    /// Creates a new Ollama generator with default localhost URL.
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_url(OLLAMA_DEFAULT_URL, model)
    }

    /// Creates a new Ollama generator with a custom URL.
    pub fn with_url(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            inner: OpenAiCompletions::custom(base_url, None, model),
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn complete(&self, request: &CompletionRequest) -> GenerationResult<CompletionResponse> {
        self.inner.complete(request).await
    }
}
