//! Text embedding providers.
//!
//! Embeddings turn press releases and articles into points in the same
//! vector space so they can be compared by the index.

mod pinecone;
mod traits;

pub use pinecone::{PineconeEmbedder, DEFAULT_EMBEDDING_MODEL};
pub use traits::{EmbeddingError, EmbeddingProvider, EmbeddingResult, InputType};
