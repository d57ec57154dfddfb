//! Vector index backends.
//!
//! - [`PineconeIndex`] - hosted serverless index
//! - [`MemoryIndex`] - exhaustive in-process index

mod memory;
mod pinecone;
mod traits;

pub use memory::MemoryIndex;
pub use pinecone::{PineconeIndex, ServerlessIndexSpec};
pub use traits::{IndexError, IndexResult, VectorIndex};
