//! One-time seeding of the document store and vector index.
//!
//! Articles and press releases are read from flat CSV files with a header
//! row, or from JSON arrays of records keyed by the same column names. Articles are then embedded as
//! passages, upserted into the vector index with their journalist metadata,
//! and the embedding is written back onto the stored article.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{Article, ArticleId, EmbeddingVector, PressRelease, VectorRecord};
use crate::providers::embeddings::{EmbeddingError, EmbeddingProvider, InputType};
use crate::providers::index::{IndexError, VectorIndex};
use crate::storage::{self, DatabaseError};

/// Largest batch the hosted embedding model accepts in one request.
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 96;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Expected {expected} embeddings, got {actual}")]
    EmbeddingCountMismatch { expected: usize, actual: usize },
}

/// Result type for seeding operations.
pub type Result<T> = std::result::Result<T, SeedError>;

/// Write access to the document store used during seeding.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn insert_articles(&self, articles: &[Article]) -> storage::Result<usize>;

    async fn insert_press_releases(&self, releases: &[PressRelease]) -> storage::Result<usize>;

    /// Articles that have not been embedded yet, in insertion order.
    async fn articles_without_embedding(&self) -> storage::Result<Vec<Article>>;

    async fn set_article_embedding(
        &self,
        id: &ArticleId,
        embedding: &EmbeddingVector,
    ) -> storage::Result<()>;
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub articles_loaded: usize,
    pub press_releases_loaded: usize,
    pub articles_indexed: usize,
}

/// Reads seed records from disk.
///
/// Files ending in `.csv` are read as CSV with a header row; anything else
/// must hold a JSON array.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let io_error = |source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    };

    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        let file = std::fs::File::open(path).map_err(io_error)?;
        return csv::Reader::from_reader(file)
            .deserialize()
            .collect::<std::result::Result<Vec<T>, _>>()
            .map_err(|source| SeedError::Csv {
                path: path.to_path_buf(),
                source,
            });
    }

    let raw = std::fs::read_to_string(path).map_err(io_error)?;
    serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads documents into the store and indexes article embeddings.
pub struct SeedService {
    store: Arc<dyn ArticleStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    batch_size: usize,
}

impl SeedService {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            store,
            embedder,
            index,
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Seeds from an articles file and a press releases file.
    pub async fn seed_from_files(
        &self,
        articles_path: &Path,
        press_releases_path: &Path,
    ) -> Result<SeedReport> {
        let articles: Vec<Article> = load_records(articles_path)?;
        let releases: Vec<PressRelease> = load_records(press_releases_path)?;
        self.seed(&articles, &releases).await
    }

    /// Stores the documents, then indexes every article without an embedding.
    pub async fn seed(
        &self,
        articles: &[Article],
        press_releases: &[PressRelease],
    ) -> Result<SeedReport> {
        let articles_loaded = self.store.insert_articles(articles).await?;
        let press_releases_loaded = self.store.insert_press_releases(press_releases).await?;
        info!(
            articles = articles_loaded,
            press_releases = press_releases_loaded,
            "Stored documents"
        );

        let articles_indexed = self.index_pending_articles().await?;

        Ok(SeedReport {
            articles_loaded,
            press_releases_loaded,
            articles_indexed,
        })
    }

    /// Embeds and indexes stored articles that have no embedding yet.
    ///
    /// Safe to re-run: articles are marked as embedded batch by batch, so an
    /// interrupted run resumes where it stopped.
    pub async fn index_pending_articles(&self) -> Result<usize> {
        let pending = self.store.articles_without_embedding().await?;
        let mut indexed = 0;

        for batch in pending.chunks(self.batch_size) {
            let inputs: Vec<String> = batch.iter().map(Article::embedding_input).collect();
            let embeddings = self.embedder.embed(&inputs, InputType::Passage).await?;
            if embeddings.len() != batch.len() {
                return Err(SeedError::EmbeddingCountMismatch {
                    expected: batch.len(),
                    actual: embeddings.len(),
                });
            }

            let records: Vec<VectorRecord> = batch
                .iter()
                .zip(&embeddings)
                .map(|(article, values)| VectorRecord {
                    id: article.id.to_string(),
                    values: values.clone(),
                    metadata: article.index_metadata(),
                })
                .collect();
            self.index.upsert(&records).await?;

            for (article, embedding) in batch.iter().zip(&embeddings) {
                self.store
                    .set_article_embedding(&article.id, embedding)
                    .await?;
            }

            indexed += batch.len();
            debug!(indexed, total = pending.len(), "Indexed article batch");
        }

        info!(articles = indexed, index = self.index.name(), "Indexed articles");
        Ok(indexed)
    }
}
