//! External service providers.
//!
//! This module contains provider traits and implementations for the hosted
//! services the ranking pipeline orchestrates:
//!
//! - [`embeddings`] - Text embedding (Pinecone Inference)
//! - [`index`] - Nearest-neighbor vector index (Pinecone, in-memory)
//! - [`generation`] - Prompt completion (OpenAI-compatible, Ollama)

pub mod embeddings;
pub mod generation;
pub mod index;
mod pinecone;

pub use pinecone::{PINECONE_API_URL, PINECONE_API_VERSION};
