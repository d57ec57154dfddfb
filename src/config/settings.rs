//! Application settings and configuration types.
//!
//! Settings are persisted to `~/.config/relevance-ranking/settings.json` (or
//! the platform equivalent) and loaded at startup. Missing files and missing
//! fields fall back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::embeddings::DEFAULT_EMBEDDING_MODEL;
use crate::providers::generation::{DEFAULT_COMPLETION_MODEL, OLLAMA_DEFAULT_URL, OPENAI_BASE_URL};
use crate::providers::PINECONE_API_URL;
use crate::services::{OutputOrder, RankingConfig, DEFAULT_MAX_TOKENS, DEFAULT_TOP_K};
use crate::storage::KeychainAccess;

const SETTINGS_FILE: &str = "settings.json";
const DATABASE_FILE: &str = "ranking.db";

/// Errors that can occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No home directory available for configuration")]
    NoConfigDir,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "relevance-ranking", "relevance-ranking")
}

/// Top-level application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hosted embedding and vector index configuration.
    pub pinecone: PineconeSettings,
    /// Motivation generation configuration.
    pub generation: GenerationSettings,
    /// Pipeline tunables.
    pub ranking: RankingSettings,
    /// Local document store.
    pub storage: StorageSettings,
}

impl Settings {
    /// Default location of the settings file.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Loads settings from the default location.
    pub fn load() -> Result<Self, SettingsError> {
        let path = Self::default_path().ok_or(SettingsError::NoConfigDir)?;
        Self::load_from(&path)
    }

    /// Loads settings from `path`, returning defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes settings as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)
    }

    /// Database location, falling back to the platform data directory.
    pub fn database_path(&self) -> Result<PathBuf, SettingsError> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
                .ok_or(SettingsError::NoConfigDir),
        }
    }

    /// Pipeline configuration derived from the ranking and generation sections.
    pub fn ranking_config(&self) -> RankingConfig {
        RankingConfig {
            top_k: self.ranking.top_k,
            max_tokens: self.generation.max_tokens,
            temperature: self.generation.temperature,
            output_order: self.ranking.output_order,
            embedding_timeout: Duration::from_secs(self.ranking.embedding_timeout_secs),
            search_timeout: Duration::from_secs(self.ranking.search_timeout_secs),
            generation_timeout: Duration::from_secs(self.ranking.generation_timeout_secs),
        }
    }
}

/// Pinecone inference and index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeSettings {
    /// Keychain identifier for the API key.
    pub api_key_keychain_id: String,
    /// Environment variable checked before the keychain.
    pub api_key_env: String,
    /// Data-plane host of the index. Unset means the in-process index is used.
    pub index_host: Option<String>,
    /// Name used when creating the index.
    pub index_name: String,
    /// Optional namespace within the index.
    pub namespace: Option<String>,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Vector dimension of the embedding model.
    pub dimension: usize,
    /// Control-plane and inference API base URL.
    pub control_url: String,
}

impl Default for PineconeSettings {
    fn default() -> Self {
        Self {
            api_key_keychain_id: KeychainAccess::api_key_id("pinecone"),
            api_key_env: "PINECONE_API_KEY".to_string(),
            index_host: None,
            index_name: "example-index".to_string(),
            namespace: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimension: 1024,
            control_url: PINECONE_API_URL.to_string(),
        }
    }
}

/// Which completion backend produces motivations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    /// Hosted OpenAI completions.
    #[default]
    OpenAi,
    /// Local Ollama server.
    Ollama,
}

/// Motivation generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Completion backend.
    pub provider: GenerationProvider,
    /// Custom API endpoint (for self-hosted or compatible APIs).
    pub base_url: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens per motivation.
    pub max_tokens: usize,
    /// Sampling temperature. Unset uses the provider default.
    pub temperature: Option<f32>,
    /// Keychain identifier for the API key.
    pub api_key_keychain_id: String,
    /// Environment variable checked before the keychain.
    pub api_key_env: String,
}

impl GenerationSettings {
    /// API base URL for the configured provider.
    pub fn effective_base_url(&self) -> &str {
        match (&self.base_url, self.provider) {
            (Some(url), _) => url.as_str(),
            (None, GenerationProvider::OpenAi) => OPENAI_BASE_URL,
            (None, GenerationProvider::Ollama) => OLLAMA_DEFAULT_URL,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::default(),
            base_url: None,
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            api_key_keychain_id: KeychainAccess::api_key_id("openai"),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Ranking pipeline tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    /// Nearest articles fetched per ranking.
    pub top_k: usize,
    /// Order of the returned journalists.
    pub output_order: OutputOrder,
    pub embedding_timeout_secs: u64,
    pub search_timeout_secs: u64,
    pub generation_timeout_secs: u64,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            output_order: OutputOrder::default(),
            embedding_timeout_secs: 30,
            search_timeout_secs: 10,
            generation_timeout_secs: 30,
        }
    }
}

/// Local document store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite database file. Unset uses the platform data directory.
    pub database_path: Option<PathBuf>,
}
