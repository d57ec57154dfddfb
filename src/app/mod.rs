//! Application wiring and lifecycle.
//!
//! [`App`] turns [`Settings`] into concrete providers and services and
//! exposes the operations the CLI drives.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::config::{resolve_api_key, GenerationProvider, Settings};
use crate::domain::{Journalist, VectorRecord};
use crate::providers::embeddings::{EmbeddingProvider, PineconeEmbedder};
use crate::providers::generation::{OllamaGenerator, OpenAiCompletions, TextGenerator};
use crate::providers::index::{MemoryIndex, PineconeIndex, ServerlessIndexSpec, VectorIndex};
use crate::services::{OutputOrder, PressReleaseStore, RankingService, SeedReport, SeedService};
use crate::storage::{KeychainAccess, StorageLayer};

/// Hosted service whose API key can be stored in the keychain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTarget {
    Pinecone,
    OpenAi,
}

/// Main application entry point.
pub struct App {
    settings: Settings,
    storage: Arc<StorageLayer>,
}

impl App {
    /// Opens the document store described by `settings`.
    pub async fn open(settings: Settings) -> Result<Self> {
        let db_path = settings.database_path()?;
        let storage = StorageLayer::new(&db_path)
            .await
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

        Ok(Self::with_storage(settings, storage))
    }

    /// Uses an already opened storage layer.
    pub fn with_storage(settings: Settings, storage: StorageLayer) -> Self {
        Self {
            settings,
            storage: storage.into_arc(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn storage(&self) -> &StorageLayer {
        &self.storage
    }

    /// Ranks journalists for the press releases of one newsroom.
    pub async fn rank(
        &self,
        newsroom: &str,
        output_order: Option<OutputOrder>,
    ) -> Result<Vec<Journalist>> {
        let mut service = self.ranking_service().await?;
        if let Some(order) = output_order {
            service = service.with_output_order(order);
        }

        let journalists = service
            .rank_newsroom(self.storage.as_ref(), newsroom)
            .await?;
        Ok(journalists)
    }

    /// Distinct newsroom names in the document store.
    pub async fn newsrooms(&self) -> Result<Vec<String>> {
        Ok(self.storage.list_newsrooms().await?)
    }

    /// Loads seed files and indexes the articles.
    pub async fn seed(&self, articles: &Path, press_releases: &Path) -> Result<SeedReport> {
        let service = SeedService::new(
            self.storage.clone(),
            self.embedder().await?,
            self.index().await?,
        );
        let report = service.seed_from_files(articles, press_releases).await?;
        Ok(report)
    }

    /// Stores an API key in the OS keychain.
    pub async fn store_api_key(&self, target: KeyTarget, key: &str) -> Result<()> {
        let keychain_id = match target {
            KeyTarget::Pinecone => &self.settings.pinecone.api_key_keychain_id,
            KeyTarget::OpenAi => &self.settings.generation.api_key_keychain_id,
        };
        self.storage
            .keychain()
            .save_api_key(keychain_id, key)
            .await?;
        info!(?target, "Stored API key");
        Ok(())
    }

    /// Creates the configured serverless index and returns its host.
    pub async fn create_index(&self) -> Result<String> {
        let pinecone = &self.settings.pinecone;
        let api_key = self.pinecone_key().await?;
        let spec = ServerlessIndexSpec::new(&pinecone.index_name, pinecone.dimension);

        let host = PineconeIndex::create_serverless_at(&pinecone.control_url, &api_key, &spec)
            .await
            .with_context(|| format!("Failed to create index '{}'", pinecone.index_name))?;
        info!(index = %pinecone.index_name, %host, "Created index");
        Ok(host)
    }

    /// Builds the ranking pipeline from the current settings.
    pub async fn ranking_service(&self) -> Result<RankingService> {
        Ok(RankingService::new(
            self.embedder().await?,
            self.index().await?,
            self.generator().await?,
            self.settings.ranking_config(),
        ))
    }

    async fn pinecone_key(&self) -> Result<String> {
        let pinecone = &self.settings.pinecone;
        resolve_api_key(
            &pinecone.api_key_env,
            self.storage.keychain(),
            &pinecone.api_key_keychain_id,
        )
        .await?
        .with_context(|| {
            format!(
                "No Pinecone API key: set {} or run `keys set pinecone`",
                pinecone.api_key_env
            )
        })
    }

    async fn embedder(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        let pinecone = &self.settings.pinecone;
        Ok(Arc::new(PineconeEmbedder::with_base_url(
            &pinecone.control_url,
            self.pinecone_key().await?,
            &pinecone.embedding_model,
        )))
    }

    /// Hosted index when a host is configured, otherwise an in-process index
    /// rebuilt from the embeddings stored with each article.
    async fn index(&self) -> Result<Arc<dyn VectorIndex>> {
        let pinecone = &self.settings.pinecone;
        if let Some(host) = &pinecone.index_host {
            let mut index = PineconeIndex::new(host, self.pinecone_key().await?)?;
            if let Some(namespace) = &pinecone.namespace {
                index = index.with_namespace(namespace);
            }
            return Ok(Arc::new(index));
        }

        let records: Vec<VectorRecord> = self
            .storage
            .list_articles()
            .await?
            .into_iter()
            .filter_map(|article| {
                let metadata = article.index_metadata();
                article.embedding.map(|values| VectorRecord {
                    id: article.id.to_string(),
                    values,
                    metadata,
                })
            })
            .collect();

        let index = MemoryIndex::new();
        index.upsert(&records).await?;
        info!(records = records.len(), "Loaded in-process index");
        Ok(Arc::new(index))
    }

    async fn generator(&self) -> Result<Arc<dyn TextGenerator>> {
        let generation = &self.settings.generation;
        let base_url = generation.effective_base_url();

        match generation.provider {
            GenerationProvider::Ollama => Ok(Arc::new(OllamaGenerator::with_url(
                base_url,
                &generation.model,
            ))),
            GenerationProvider::OpenAi => {
                let api_key = resolve_api_key(
                    &generation.api_key_env,
                    self.storage.keychain(),
                    &generation.api_key_keychain_id,
                )
                .await?;
                if api_key.is_none() && generation.base_url.is_none() {
                    bail!(
                        "No OpenAI API key: set {} or run `keys set openai`",
                        generation.api_key_env
                    );
                }
                Ok(Arc::new(OpenAiCompletions::custom(
                    base_url,
                    api_key,
                    &generation.model,
                )))
            }
        }
    }
}

impl KeyTarget {
    /// Keychain service name used in the default keychain ids.
    pub fn service(&self) -> &'static str {
        match self {
            KeyTarget::Pinecone => "pinecone",
            KeyTarget::OpenAi => "openai",
        }
    }

    pub fn default_keychain_id(&self) -> String {
        KeychainAccess::api_key_id(self.service())
    }
}
