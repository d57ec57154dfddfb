//! Document and credential storage.
//!
//! This module provides the storage layer for relevance ranking, including:
//!
//! - SQLite database for articles and press releases
//! - OS keychain integration for API keys
//! - Async-safe database operations via tokio::task::spawn_blocking

mod database;
mod keychain;
pub mod queries;
mod schema;

pub use database::{Database, DatabaseError, Result};
pub use keychain::{KeychainAccess, KeychainError};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Article, ArticleId, EmbeddingVector, PressRelease};
use crate::services::{ArticleStore, PressReleaseStore};

/// Combined storage layer with database and keychain access.
///
/// This is the main entry point for storage operations.
#[derive(Debug, Clone)]
pub struct StorageLayer {
    db: Database,
    keychain: KeychainAccess,
}

impl StorageLayer {
    /// Creates a new storage layer with the given database path.
    pub async fn new(db_path: impl AsRef<std::path::Path>) -> Result<Self> {
        let db = Database::open(db_path).await?;
        let keychain = KeychainAccess::new();

        Ok(Self { db, keychain })
    }

    /// Creates a storage layer with an in-memory database for testing.
    pub async fn in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        let keychain = KeychainAccess::with_service("io.relevance-ranking.test");

        Ok(Self { db, keychain })
    }

    /// Returns a reference to the database.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Returns a reference to the keychain.
    pub fn keychain(&self) -> &KeychainAccess {
        &self.keychain
    }

    /// Wraps the storage layer in an Arc for shared ownership.
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// All stored articles in insertion order.
    pub async fn list_articles(&self) -> Result<Vec<Article>> {
        self.db
            .with_conn(|conn| Ok(queries::articles::get_all(conn)?))
            .await
    }
}

#[async_trait]
impl PressReleaseStore for StorageLayer {
    async fn find_press_releases(&self, filter: &str) -> Result<Vec<PressRelease>> {
        let filter = filter.to_string();
        self.db
            .with_conn(move |conn| {
                Ok(queries::press_releases::find_by_newsroom(
                    conn,
                    &filter,
                    queries::press_releases::NEWSROOM_MATCH_LIMIT,
                )?)
            })
            .await
    }

    async fn list_newsrooms(&self) -> Result<Vec<String>> {
        self.db
            .with_conn(|conn| Ok(queries::press_releases::list_newsrooms(conn)?))
            .await
    }
}

#[async_trait]
impl ArticleStore for StorageLayer {
    async fn insert_articles(&self, articles: &[Article]) -> Result<usize> {
        let articles = articles.to_vec();
        self.db
            .transaction(move |tx| {
                for article in &articles {
                    queries::articles::upsert(tx, article)?;
                }
                Ok(articles.len())
            })
            .await
    }

    async fn insert_press_releases(&self, releases: &[PressRelease]) -> Result<usize> {
        let releases = releases.to_vec();
        self.db
            .transaction(move |tx| {
                for release in &releases {
                    queries::press_releases::upsert(tx, release)?;
                }
                Ok(releases.len())
            })
            .await
    }

    async fn articles_without_embedding(&self) -> Result<Vec<Article>> {
        self.db
            .with_conn(|conn| Ok(queries::articles::get_without_embedding(conn)?))
            .await
    }

    async fn set_article_embedding(
        &self,
        id: &ArticleId,
        embedding: &EmbeddingVector,
    ) -> Result<()> {
        let id = id.clone();
        let embedding = embedding.clone();
        self.db
            .with_conn(move |conn| {
                queries::articles::set_embedding(conn, &id, &embedding, Utc::now())?;
                Ok(())
            })
            .await
    }
}
