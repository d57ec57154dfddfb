//! Business services layer.
//!
//! This module contains the ranking pipeline and the services around it,
//! coordinating between providers, storage, and domain types.
//!
//! # Architecture
//!
//! Services sit between the CLI and the infrastructure layer:
//!
//! ```text
//! CLI (rank, newsrooms, seed)
//!          |
//!          v
//!    Services Layer  <-- You are here
//!          |
//!          v
//! Infrastructure (Providers, Storage)
//! ```
//!
//! # Services Overview
//!
//! - [`RankingService`]: Runs the embed, pool, search, score, justify pipeline
//! - [`SearchService`]: Nearest-neighbor lookup against the vector index
//! - [`JustificationService`]: Concurrent per-journalist motivation generation
//! - [`SeedService`]: Loads documents and indexes article embeddings
//! - [`scoring`]: Vector mean pooling and per-journalist score aggregation

mod error;
mod justification_service;
mod ranking_service;
pub mod scoring;
mod search_service;
mod seed_service;

pub use error::{RankingError, RankingResult};
pub use justification_service::{
    build_context, build_prompt, JustificationService, DEFAULT_GENERATION_TIMEOUT,
    DEFAULT_MAX_TOKENS,
};
pub use ranking_service::{
    OutputOrder, PressReleaseStore, RankingConfig, RankingService, DEFAULT_EMBEDDING_TIMEOUT,
};
pub use scoring::{aggregate_scores, mean_pool, ScoreAggregation, ScoredJournalist};
pub use search_service::{SearchService, DEFAULT_SEARCH_TIMEOUT, DEFAULT_TOP_K};
pub use seed_service::{
    load_records, ArticleStore, SeedError, SeedReport, SeedService, DEFAULT_EMBED_BATCH_SIZE,
};
