//! Pipeline orchestration: press releases in, ranked journalists out.
//!
//! The stages run strictly in sequence:
//!
//! ```text
//! embed (query) -> mean_pool -> search -> aggregate_scores -> justify
//! ```
//!
//! Any stage failure aborts the call; a ranking either completes with every
//! journalist justified or returns a single [`RankingError`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::domain::{EmbeddingVector, Journalist, PressRelease};
use crate::providers::embeddings::{EmbeddingProvider, InputType};
use crate::providers::generation::TextGenerator;
use crate::providers::index::VectorIndex;
use crate::storage;

use super::error::{RankingError, RankingResult};
use super::justification_service::{
    JustificationService, DEFAULT_GENERATION_TIMEOUT, DEFAULT_MAX_TOKENS,
};
use super::scoring::{aggregate_scores, mean_pool};
use super::search_service::{SearchService, DEFAULT_SEARCH_TIMEOUT, DEFAULT_TOP_K};

/// Default time allowed for embedding the press releases.
pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(30);

/// Order of the journalists in a ranking result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputOrder {
    /// Order in which journalists first appear among the search matches.
    #[default]
    FirstAppearance,
    /// Highest relevance first; ties keep first-appearance order.
    ScoreDescending,
}

/// Read access to stored press releases.
#[async_trait]
pub trait PressReleaseStore: Send + Sync {
    /// Press releases whose newsroom contains `filter`, case-insensitively.
    async fn find_press_releases(&self, filter: &str) -> storage::Result<Vec<PressRelease>>;

    /// Distinct newsroom names, sorted.
    async fn list_newsrooms(&self) -> storage::Result<Vec<String>>;
}

/// Tunables for one [`RankingService`].
#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub top_k: usize,
    pub max_tokens: usize,
    pub temperature: Option<f32>,
    pub output_order: OutputOrder,
    pub embedding_timeout: Duration,
    pub search_timeout: Duration,
    pub generation_timeout: Duration,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            output_order: OutputOrder::default(),
            embedding_timeout: DEFAULT_EMBEDDING_TIMEOUT,
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

/// Ranks journalists by relevance to a set of press releases.
///
/// Holds no state between calls; concurrent `rank` calls are independent.
#[derive(Clone)]
pub struct RankingService {
    embedder: Arc<dyn EmbeddingProvider>,
    search: SearchService,
    justifier: JustificationService,
    output_order: OutputOrder,
    embedding_timeout: Duration,
}

impl RankingService {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn TextGenerator>,
        config: RankingConfig,
    ) -> Self {
        let search = SearchService::new(index)
            .with_top_k(config.top_k)
            .with_timeout(config.search_timeout);

        let mut justifier = JustificationService::new(generator)
            .with_max_tokens(config.max_tokens)
            .with_timeout(config.generation_timeout);
        if let Some(temperature) = config.temperature {
            justifier = justifier.with_temperature(temperature);
        }

        Self {
            embedder,
            search,
            justifier,
            output_order: config.output_order,
            embedding_timeout: config.embedding_timeout,
        }
    }

    /// Overrides the configured output order.
    pub fn with_output_order(mut self, output_order: OutputOrder) -> Self {
        self.output_order = output_order;
        self
    }

    /// Runs the full pipeline for the given press releases.
    ///
    /// Returns one entry per distinct journalist email found among the
    /// nearest articles. An empty list is valid when the index holds nothing
    /// attributable to a journalist.
    #[instrument(skip_all, fields(press_releases = press_releases.len()))]
    pub async fn rank(&self, press_releases: &[PressRelease]) -> RankingResult<Vec<Journalist>> {
        if press_releases.is_empty() {
            return Err(RankingError::InvalidInput(
                "at least one press release is required".to_string(),
            ));
        }

        let started = Instant::now();

        let embeddings = self.embed_press_releases(press_releases).await?;
        let query = mean_pool(&embeddings)?;
        debug!(dimension = query.dimension(), "Pooled query vector");

        let matches = self.search.search(&query).await?;

        let aggregation = aggregate_scores(&matches);
        if aggregation.skipped() > 0 {
            info!(
                skipped = aggregation.skipped(),
                "Ignored matches without journalist email or score"
            );
        }

        let mut scored = aggregation.journalists();
        if self.output_order == OutputOrder::ScoreDescending {
            scored.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        }

        let journalists = self.justifier.justify(&scored, press_releases).await?;

        info!(
            matches = matches.len(),
            journalists = journalists.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Ranking complete"
        );

        Ok(journalists)
    }

    /// Looks up press releases by newsroom and ranks journalists for them.
    pub async fn rank_newsroom<S>(
        &self,
        store: &S,
        newsroom_filter: &str,
    ) -> RankingResult<Vec<Journalist>>
    where
        S: PressReleaseStore + ?Sized,
    {
        let filter = newsroom_filter.trim();
        if filter.is_empty() {
            return Err(RankingError::InvalidInput(
                "newsroom not specified".to_string(),
            ));
        }

        let press_releases = store.find_press_releases(filter).await?;
        if press_releases.is_empty() {
            return Err(RankingError::InvalidInput(format!(
                "no press releases found for newsroom '{}'",
                filter
            )));
        }

        debug!(
            newsroom = filter,
            press_releases = press_releases.len(),
            "Loaded press releases"
        );

        self.rank(&press_releases).await
    }

    async fn embed_press_releases(
        &self,
        press_releases: &[PressRelease],
    ) -> RankingResult<Vec<EmbeddingVector>> {
        let inputs: Vec<String> = press_releases
            .iter()
            .map(PressRelease::embedding_input)
            .collect();

        let embeddings = tokio::time::timeout(
            self.embedding_timeout,
            self.embedder.embed(&inputs, InputType::Query),
        )
        .await
        .map_err(|_| {
            RankingError::EmbeddingUnavailable(format!(
                "{} timed out after {:?}",
                self.embedder.name(),
                self.embedding_timeout
            ))
        })?
        .map_err(|e| RankingError::EmbeddingUnavailable(e.to_string()))?;

        if embeddings.len() != inputs.len() {
            return Err(RankingError::EmbeddingUnavailable(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchMetadata, SearchMatch, VectorRecord};
    use crate::providers::embeddings::{EmbeddingError, EmbeddingResult};
    use crate::providers::generation::{
        CompletionRequest, CompletionResponse, FinishReason, GenerationError, GenerationResult,
        TokenUsage,
    };
    use crate::providers::index::{IndexError, IndexResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Embedder returning a fixed vector per input, or a canned failure.
    struct StubEmbedder {
        vectors: Vec<EmbeddingVector>,
        fail: bool,
        inputs: Mutex<Vec<(Vec<String>, InputType)>>,
    }

    impl StubEmbedder {
        fn returning(vectors: Vec<Vec<f32>>) -> Self {
            Self {
                vectors: vectors.into_iter().map(EmbeddingVector::new).collect(),
                fail: false,
                inputs: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::returning(Vec::new())
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        fn name(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        async fn embed(
            &self,
            texts: &[String],
            input_type: InputType,
        ) -> EmbeddingResult<Vec<EmbeddingVector>> {
            self.inputs
                .lock()
                .unwrap()
                .push((texts.to_vec(), input_type));
            if self.fail {
                return Err(EmbeddingError::ApiError {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(self.vectors.clone())
        }
    }

    /// Index returning canned matches and recording the query vector.
    struct StubIndex {
        matches: Vec<SearchMatch>,
        fail: bool,
        queries: Mutex<Vec<(EmbeddingVector, usize)>>,
    }

    impl StubIndex {
        fn returning(matches: Vec<SearchMatch>) -> Self {
            Self {
                matches,
                fail: false,
                queries: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::returning(Vec::new())
            }
        }
    }

    #[async_trait]
    impl VectorIndex for StubIndex {
        fn name(&self) -> &str {
            "stub"
        }

        async fn query(
            &self,
            vector: &EmbeddingVector,
            top_k: usize,
        ) -> IndexResult<Vec<SearchMatch>> {
            self.queries.lock().unwrap().push((vector.clone(), top_k));
            if self.fail {
                return Err(IndexError::InvalidResponse("garbage".to_string()));
            }
            Ok(self.matches.clone())
        }

        async fn upsert(&self, records: &[VectorRecord]) -> IndexResult<usize> {
            Ok(records.len())
        }
    }

    /// Generator answering "Because {email}" and counting calls.
    struct StubGenerator {
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubGenerator {
        fn new() -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        fn name(&self) -> &str {
            "stub"
        }

        fn model(&self) -> &str {
            "stub-model"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> GenerationResult<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GenerationError::Unavailable("model offline".to_string()));
            }
            let email = request
                .prompt
                .split("journalist with email ")
                .nth(1)
                .and_then(|rest| rest.split(',').next())
                .unwrap_or_default();
            Ok(CompletionResponse {
                text: format!(" Because {} \n", email),
                tokens_used: TokenUsage::default(),
                finish_reason: FinishReason::Stop,
            })
        }
    }

    /// Store serving a fixed list of press releases.
    struct StubStore {
        releases: Vec<PressRelease>,
        filters: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PressReleaseStore for StubStore {
        async fn find_press_releases(&self, filter: &str) -> storage::Result<Vec<PressRelease>> {
            self.filters.lock().unwrap().push(filter.to_string());
            let filter = filter.to_lowercase();
            Ok(self
                .releases
                .iter()
                .filter(|r| r.newsroom.to_lowercase().contains(&filter))
                .cloned()
                .collect())
        }

        async fn list_newsrooms(&self) -> storage::Result<Vec<String>> {
            Ok(self.releases.iter().map(|r| r.newsroom.clone()).collect())
        }
    }

    fn release(headline: &str) -> PressRelease {
        PressRelease::new("Acme", headline, "Body text.")
    }

    fn service(
        embedder: Arc<StubEmbedder>,
        index: Arc<StubIndex>,
        generator: Arc<StubGenerator>,
    ) -> RankingService {
        RankingService::new(embedder, index, generator, RankingConfig::default())
    }

    fn two_journalist_matches() -> Vec<SearchMatch> {
        vec![
            SearchMatch::new("a1", 0.9, "j@x.com"),
            SearchMatch::new("a2", 0.5, "k@x.com"),
            SearchMatch::new("a3", 0.7, "j@x.com"),
        ]
    }

    #[tokio::test]
    async fn rank_end_to_end() {
        let embedder = Arc::new(StubEmbedder::returning(vec![vec![1.0, 0.0]]));
        let index = Arc::new(StubIndex::returning(two_journalist_matches()));
        let generator = Arc::new(StubGenerator::new());
        let service = service(embedder, index, generator.clone());

        let journalists = service.rank(&[release("Launch")]).await.unwrap();

        assert_eq!(journalists.len(), 2);
        assert_eq!(journalists[0].email, "j@x.com");
        assert!((journalists[0].relevance_score - 0.8).abs() < 1e-9);
        assert_eq!(journalists[0].motivation, "Because j@x.com");
        assert_eq!(journalists[1].email, "k@x.com");
        assert!((journalists[1].relevance_score - 0.5).abs() < 1e-9);
        assert_eq!(journalists[1].motivation, "Because k@x.com");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rank_embeds_queries_and_pools() {
        let embedder = Arc::new(StubEmbedder::returning(vec![
            vec![1.0, 3.0],
            vec![3.0, 5.0],
        ]));
        let index = Arc::new(StubIndex::returning(Vec::new()));
        let generator = Arc::new(StubGenerator::new());
        let service = service(embedder.clone(), index.clone(), generator);

        let mut first = release("One");
        first.newsroom = "Acme".to_string();
        first.text = "Alpha".to_string();
        service.rank(&[first, release("Two")]).await.unwrap();

        let inputs = embedder.inputs.lock().unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].0[0], "One-Acme-Alpha");
        assert_eq!(inputs[0].1, InputType::Query);

        let queries = index.queries.lock().unwrap();
        assert_eq!(queries[0].0.values, vec![2.0, 4.0]);
        assert_eq!(queries[0].1, DEFAULT_TOP_K);
    }

    #[tokio::test]
    async fn rank_single_release_queries_its_own_vector() {
        let embedder = Arc::new(StubEmbedder::returning(vec![vec![0.3, -0.7, 0.1]]));
        let index = Arc::new(StubIndex::returning(Vec::new()));
        let service = service(embedder, index.clone(), Arc::new(StubGenerator::new()));

        service.rank(&[release("Solo")]).await.unwrap();

        let queries = index.queries.lock().unwrap();
        assert_eq!(queries[0].0.values, vec![0.3, -0.7, 0.1]);
    }

    #[tokio::test]
    async fn rank_rejects_empty_input_without_calls() {
        let embedder = Arc::new(StubEmbedder::returning(vec![vec![1.0]]));
        let index = Arc::new(StubIndex::returning(Vec::new()));
        let service = service(embedder.clone(), index.clone(), Arc::new(StubGenerator::new()));

        let err = service.rank(&[]).await.unwrap_err();
        assert!(matches!(err, RankingError::InvalidInput(_)));
        assert!(embedder.inputs.lock().unwrap().is_empty());
        assert!(index.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rank_no_matches_returns_empty_list() {
        let embedder = Arc::new(StubEmbedder::returning(vec![vec![1.0]]));
        let index = Arc::new(StubIndex::returning(Vec::new()));
        let generator = Arc::new(StubGenerator::new());
        let service = service(embedder, index, generator.clone());

        let journalists = service.rank(&[release("Quiet")]).await.unwrap();
        assert!(journalists.is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rank_skips_matches_without_email() {
        let matches = vec![
            SearchMatch::new("a1", 0.9, "j@x.com"),
            SearchMatch {
                id: "a2".to_string(),
                score: Some(0.99),
                metadata: Some(MatchMetadata::default()),
            },
        ];
        let service = service(
            Arc::new(StubEmbedder::returning(vec![vec![1.0]])),
            Arc::new(StubIndex::returning(matches)),
            Arc::new(StubGenerator::new()),
        );

        let journalists = service.rank(&[release("Launch")]).await.unwrap();
        assert_eq!(journalists.len(), 1);
        assert_eq!(journalists[0].email, "j@x.com");
    }

    #[tokio::test]
    async fn search_failure_skips_generation() {
        let generator = Arc::new(StubGenerator::new());
        let service = service(
            Arc::new(StubEmbedder::returning(vec![vec![1.0]])),
            Arc::new(StubIndex::failing()),
            generator.clone(),
        );

        let err = service.rank(&[release("Launch")]).await.unwrap_err();
        assert!(matches!(err, RankingError::SearchUnavailable(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generation_failure_returns_no_partial_list() {
        let service = service(
            Arc::new(StubEmbedder::returning(vec![vec![1.0]])),
            Arc::new(StubIndex::returning(two_journalist_matches())),
            Arc::new(StubGenerator::failing()),
        );

        let err = service.rank(&[release("Launch")]).await.unwrap_err();
        assert!(matches!(err, RankingError::GenerationFailure { .. }));
    }

    #[tokio::test]
    async fn embedding_failure_skips_search() {
        let index = Arc::new(StubIndex::returning(two_journalist_matches()));
        let service = service(
            Arc::new(StubEmbedder::failing()),
            index.clone(),
            Arc::new(StubGenerator::new()),
        );

        let err = service.rank(&[release("Launch")]).await.unwrap_err();
        assert!(matches!(err, RankingError::EmbeddingUnavailable(_)));
        assert!(index.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn embedding_count_mismatch_is_rejected() {
        let service = service(
            Arc::new(StubEmbedder::returning(vec![vec![1.0]])),
            Arc::new(StubIndex::returning(Vec::new())),
            Arc::new(StubGenerator::new()),
        );

        let err = service
            .rank(&[release("One"), release("Two")])
            .await
            .unwrap_err();
        assert!(matches!(err, RankingError::EmbeddingUnavailable(_)));
    }

    #[tokio::test]
    async fn score_descending_order() {
        let matches = vec![
            SearchMatch::new("a1", 0.4, "low@x.com"),
            SearchMatch::new("a2", 0.9, "high@x.com"),
            SearchMatch::new("a3", 0.4, "tie@x.com"),
        ];
        let service = service(
            Arc::new(StubEmbedder::returning(vec![vec![1.0]])),
            Arc::new(StubIndex::returning(matches)),
            Arc::new(StubGenerator::new()),
        )
        .with_output_order(OutputOrder::ScoreDescending);

        let emails: Vec<_> = service
            .rank(&[release("Launch")])
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.email)
            .collect();
        assert_eq!(emails, vec!["high@x.com", "low@x.com", "tie@x.com"]);
    }

    #[tokio::test]
    async fn rank_newsroom_uses_store() {
        let store = StubStore {
            releases: vec![
                release("Launch"),
                PressRelease::new("Globex", "Other", "Unrelated."),
            ],
            filters: Mutex::new(Vec::new()),
        };
        let embedder = Arc::new(StubEmbedder::returning(vec![vec![1.0]]));
        let service = service(
            embedder.clone(),
            Arc::new(StubIndex::returning(two_journalist_matches())),
            Arc::new(StubGenerator::new()),
        );

        let journalists = service.rank_newsroom(&store, " acme ").await.unwrap();
        assert_eq!(journalists.len(), 2);
        assert_eq!(store.filters.lock().unwrap().as_slice(), ["acme"]);
        assert_eq!(embedder.inputs.lock().unwrap()[0].0.len(), 1);
    }

    #[tokio::test]
    async fn rank_newsroom_rejects_empty_filter() {
        let store = StubStore {
            releases: vec![release("Launch")],
            filters: Mutex::new(Vec::new()),
        };
        let service = service(
            Arc::new(StubEmbedder::returning(vec![vec![1.0]])),
            Arc::new(StubIndex::returning(Vec::new())),
            Arc::new(StubGenerator::new()),
        );

        let err = service.rank_newsroom(&store, "  ").await.unwrap_err();
        assert!(matches!(err, RankingError::InvalidInput(_)));
        assert!(store.filters.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rank_newsroom_without_releases_is_invalid() {
        let store = StubStore {
            releases: vec![release("Launch")],
            filters: Mutex::new(Vec::new()),
        };
        let service = service(
            Arc::new(StubEmbedder::returning(vec![vec![1.0]])),
            Arc::new(StubIndex::returning(Vec::new())),
            Arc::new(StubGenerator::new()),
        );

        let err = service.rank_newsroom(&store, "initech").await.unwrap_err();
        assert!(matches!(err, RankingError::InvalidInput(_)));
    }

    #[test]
    fn output_order_serde_names() {
        assert_eq!(
            serde_json::to_string(&OutputOrder::ScoreDescending).unwrap(),
            "\"score_descending\""
        );
        let parsed: OutputOrder = serde_json::from_str("\"first_appearance\"").unwrap();
        assert_eq!(parsed, OutputOrder::FirstAppearance);
    }
}
