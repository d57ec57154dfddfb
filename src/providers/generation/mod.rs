//! Text generation providers.
//!
//! Motivations are produced by a prompt-completion model. This module
//! provides a unified interface over the services that can serve them.
//!
//! # Supported Providers
//!
//! - **OpenAI-compatible**: OpenAI's legacy completions route and compatible servers
//! - **Ollama**: Local inference via Ollama's OpenAI-compatible API
//!
//! # Example
//!
//! ```rust,no_run
//! use relevance_ranking::providers::generation::{
//!     CompletionRequest, OpenAiCompletions, TextGenerator,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let openai = OpenAiCompletions::openai("sk-...", "gpt-3.5-turbo-instruct");
//!
//! let request = CompletionRequest::new("Why is this journalist relevant?").with_max_tokens(100);
//! let response = openai.complete(&request).await?;
//! println!("Response: {}", response.text.trim());
//! # Ok(())
//! # }
//! ```

mod ollama;
mod openai;
mod traits;

pub use ollama::{OllamaGenerator, OLLAMA_DEFAULT_URL};
pub use openai::{OpenAiCompletions, DEFAULT_COMPLETION_MODEL, OPENAI_BASE_URL};
pub use traits::{
    CompletionRequest, CompletionResponse, FinishReason, GenerationError, GenerationResult,
    TextGenerator, TokenUsage,
};
