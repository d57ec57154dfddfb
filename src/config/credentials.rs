//! API key resolution.

use crate::storage::{KeychainAccess, KeychainError};

/// Finds an API key in the environment, then in the OS keychain.
///
/// Empty environment values are ignored.
pub async fn resolve_api_key(
    env_var: &str,
    keychain: &KeychainAccess,
    keychain_id: &str,
) -> Result<Option<String>, KeychainError> {
    if let Some(key) = env_key(env_var) {
        return Ok(Some(key));
    }
    keychain.load_api_key(keychain_id).await
}

fn env_key(env_var: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_reads_and_trims() {
        std::env::set_var("RELEVANCE_RANKING_TEST_KEY_SET", "  sk-test \n");
        assert_eq!(
            env_key("RELEVANCE_RANKING_TEST_KEY_SET"),
            Some("sk-test".to_string())
        );
    }

    #[test]
    fn env_key_ignores_blank_values() {
        std::env::set_var("RELEVANCE_RANKING_TEST_KEY_BLANK", "   ");
        assert_eq!(env_key("RELEVANCE_RANKING_TEST_KEY_BLANK"), None);
        assert_eq!(env_key("RELEVANCE_RANKING_TEST_KEY_UNSET"), None);
    }

    #[tokio::test]
    async fn environment_wins_over_keychain() {
        std::env::set_var("RELEVANCE_RANKING_TEST_KEY_RESOLVE", "from-env");
        let keychain = KeychainAccess::with_service("io.relevance-ranking.test");

        let key = resolve_api_key(
            "RELEVANCE_RANKING_TEST_KEY_RESOLVE",
            &keychain,
            &KeychainAccess::api_key_id("unused"),
        )
        .await
        .unwrap();
        assert_eq!(key, Some("from-env".to_string()));
    }
}
