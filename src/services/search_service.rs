//! Nearest-neighbor lookup of journalist articles.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::domain::{EmbeddingVector, SearchMatch};
use crate::providers::index::VectorIndex;

use super::error::{RankingError, RankingResult};

/// Number of nearest articles fetched per ranking call.
pub const DEFAULT_TOP_K: usize = 10;

/// Default time allowed for one index query.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Queries the vector index for the articles closest to a query vector.
#[derive(Clone)]
pub struct SearchService {
    index: Arc<dyn VectorIndex>,
    top_k: usize,
    timeout: Duration,
}

impl SearchService {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self {
            index,
            top_k: DEFAULT_TOP_K,
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Returns at most `top_k` matches, most similar first.
    ///
    /// An empty result is valid. Index failures and timeouts surface as
    /// [`RankingError::SearchUnavailable`].
    pub async fn search(&self, vector: &EmbeddingVector) -> RankingResult<Vec<SearchMatch>> {
        if self.top_k == 0 {
            return Err(RankingError::InvalidInput(
                "top_k must be at least 1".to_string(),
            ));
        }

        let mut matches = tokio::time::timeout(self.timeout, self.index.query(vector, self.top_k))
            .await
            .map_err(|_| {
                RankingError::SearchUnavailable(format!(
                    "{} query timed out after {:?}",
                    self.index.name(),
                    self.timeout
                ))
            })?
            .map_err(|e| RankingError::SearchUnavailable(e.to_string()))?;

        matches.truncate(self.top_k);

        debug!(
            index = self.index.name(),
            matches = matches.len(),
            "Similarity search complete"
        );

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VectorRecord;
    use crate::providers::index::{IndexError, IndexResult};
    use async_trait::async_trait;

    /// Index that returns a fixed set of matches.
    struct FixedIndex {
        matches: Vec<SearchMatch>,
    }

    #[async_trait]
    impl VectorIndex for FixedIndex {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn query(
            &self,
            _vector: &EmbeddingVector,
            _top_k: usize,
        ) -> IndexResult<Vec<SearchMatch>> {
            Ok(self.matches.clone())
        }

        async fn upsert(&self, records: &[VectorRecord]) -> IndexResult<usize> {
            Ok(records.len())
        }
    }

    /// Index that always fails.
    struct DownIndex;

    #[async_trait]
    impl VectorIndex for DownIndex {
        fn name(&self) -> &str {
            "down"
        }

        async fn query(
            &self,
            _vector: &EmbeddingVector,
            _top_k: usize,
        ) -> IndexResult<Vec<SearchMatch>> {
            Err(IndexError::ApiError {
                status: 503,
                message: "service unavailable".to_string(),
            })
        }

        async fn upsert(&self, _records: &[VectorRecord]) -> IndexResult<usize> {
            Ok(0)
        }
    }

    /// Index that never answers within the test timeout.
    struct SlowIndex;

    #[async_trait]
    impl VectorIndex for SlowIndex {
        fn name(&self) -> &str {
            "slow"
        }

        async fn query(
            &self,
            _vector: &EmbeddingVector,
            _top_k: usize,
        ) -> IndexResult<Vec<SearchMatch>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }

        async fn upsert(&self, _records: &[VectorRecord]) -> IndexResult<usize> {
            Ok(0)
        }
    }

    fn query_vector() -> EmbeddingVector {
        EmbeddingVector::new(vec![0.1, 0.2, 0.3])
    }

    #[tokio::test]
    async fn search_caps_results_at_top_k() {
        let matches = (0..15)
            .map(|i| SearchMatch::new(format!("a-{}", i), 0.9, "j@x.com"))
            .collect();
        let service = SearchService::new(Arc::new(FixedIndex { matches }));

        let results = service.search(&query_vector()).await.unwrap();
        assert_eq!(results.len(), DEFAULT_TOP_K);
    }

    #[tokio::test]
    async fn search_empty_result_is_ok() {
        let service = SearchService::new(Arc::new(FixedIndex {
            matches: Vec::new(),
        }));
        assert!(service.search(&query_vector()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_failure_maps_to_unavailable() {
        let service = SearchService::new(Arc::new(DownIndex));
        let err = service.search(&query_vector()).await.unwrap_err();
        assert!(matches!(err, RankingError::SearchUnavailable(_)));
    }

    #[tokio::test]
    async fn search_timeout_maps_to_unavailable() {
        let service =
            SearchService::new(Arc::new(SlowIndex)).with_timeout(Duration::from_millis(20));
        let err = service.search(&query_vector()).await.unwrap_err();
        assert!(matches!(err, RankingError::SearchUnavailable(_)));
    }

    #[tokio::test]
    async fn search_rejects_zero_top_k() {
        let service = SearchService::new(Arc::new(FixedIndex {
            matches: Vec::new(),
        }))
        .with_top_k(0);
        let err = service.search(&query_vector()).await.unwrap_err();
        assert!(matches!(err, RankingError::InvalidInput(_)));
    }
}
