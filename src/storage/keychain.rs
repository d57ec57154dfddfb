//! OS keychain storage for hosted-service API keys.
//!
//! Keys live under one keychain service name, one entry per hosted service
//! (`api_key.pinecone`, `api_key.openai`). Values are trimmed on the way in
//! and out so a pasted trailing newline never reaches an HTTP header.

use thiserror::Error;

/// Errors that can occur while saving or loading API keys.
#[derive(Debug, Error)]
pub enum KeychainError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("API key for {0} is empty")]
    BlankKey(String),

    #[error("Keychain task failed: {0}")]
    TaskFailed(String),
}

/// Result type for keychain operations.
pub type Result<T> = std::result::Result<T, KeychainError>;

/// API key storage in the OS keychain.
#[derive(Debug, Clone)]
pub struct KeychainAccess {
    service_name: String,
}

impl KeychainAccess {
    pub const DEFAULT_SERVICE: &'static str = "io.relevance-ranking";

    pub fn new() -> Self {
        Self::with_service(Self::DEFAULT_SERVICE)
    }

    /// Uses a separate keychain namespace, e.g. for tests.
    pub fn with_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Keychain entry id for a hosted service's API key.
    pub fn api_key_id(service: &str) -> String {
        format!("api_key.{}", service)
    }

    /// Saves an API key under `keychain_id`, replacing any previous key.
    pub async fn save_api_key(&self, keychain_id: &str, key: &str) -> Result<()> {
        let key = key.trim().to_string();
        if key.is_empty() {
            return Err(KeychainError::BlankKey(keychain_id.to_string()));
        }

        self.with_entry(keychain_id, move |entry| Ok(entry.set_password(&key)?))
            .await
    }

    /// Loads the API key saved under `keychain_id`.
    ///
    /// A missing entry or one holding only whitespace yields `None`.
    pub async fn load_api_key(&self, keychain_id: &str) -> Result<Option<String>> {
        self.with_entry(keychain_id, |entry| match entry.get_password() {
            Ok(key) => Ok(non_blank(&key)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        })
        .await
    }

    /// Keyring backends block on platform IPC, so entries are only touched
    /// from the blocking pool.
    async fn with_entry<T, F>(&self, keychain_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(keyring::Entry) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = self.service_name.clone();
        let keychain_id = keychain_id.to_string();

        tokio::task::spawn_blocking(move || f(keyring::Entry::new(&service, &keychain_id)?))
            .await
            .map_err(|e| KeychainError::TaskFailed(e.to_string()))?
    }
}

impl Default for KeychainAccess {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
