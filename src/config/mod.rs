//! Configuration and settings management.
//!
//! This module provides application settings types and persistence.
//! Settings are stored in the user's config directory as JSON; API keys
//! come from the environment or the OS keychain.

mod credentials;
mod settings;

pub use credentials::resolve_api_key;
pub use settings::{
    GenerationProvider, GenerationSettings, PineconeSettings, RankingSettings, Settings,
    SettingsError, StorageSettings,
};
