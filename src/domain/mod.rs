//! Domain layer types for relevance ranking.
//!
//! This module contains the core domain types that flow through the ranking
//! pipeline: press releases and articles read from the document store,
//! embedding vectors, nearest-neighbor matches and the scored journalists
//! produced at the end.

mod article;
mod embedding;
mod journalist;
mod press_release;
mod search;
mod types;

pub use article::Article;
pub use embedding::EmbeddingVector;
pub use journalist::{Journalist, JournalistScore};
pub use press_release::PressRelease;
pub use search::{MatchMetadata, SearchMatch, VectorRecord};
pub use types::{ArticleId, PressReleaseId};
