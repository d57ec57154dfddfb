//! Natural-language motivations for recommended journalists.
//!
//! One completion is requested per journalist. Requests run concurrently and
//! the batch either fully succeeds or fails with the first error; no partial
//! list is ever returned.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::domain::{Journalist, PressRelease};
use crate::providers::generation::{CompletionRequest, TextGenerator};

use super::error::{RankingError, RankingResult};
use super::scoring::ScoredJournalist;

/// Default completion length cap for one motivation.
pub const DEFAULT_MAX_TOKENS: usize = 100;

/// Default time allowed for one completion.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Renders the press releases as prompt context, one release per line.
pub fn build_context(press_releases: &[PressRelease]) -> String {
    press_releases
        .iter()
        .map(PressRelease::prompt_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the completion prompt for one journalist.
pub fn build_prompt(context: &str, email: &str, relevance_score: f64) -> String {
    format!(
        "Based on the following press releases:\n{}\nExplain why journalist with email {}, \
         who has a relevance score of {}, is a relevant match for this content. Provide a \
         clear reason based on the similarity between the journalist's focus and the press \
         release topics.",
        context, email, relevance_score
    )
}

/// Generates a motivation for each scored journalist.
#[derive(Clone)]
pub struct JustificationService {
    generator: Arc<dyn TextGenerator>,
    max_tokens: usize,
    temperature: Option<f32>,
    timeout: Duration,
}

impl JustificationService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Overrides the provider's default sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Produces one [`Journalist`] per input, in input order.
    ///
    /// Emails and scores pass through unchanged; the motivation is the
    /// trimmed completion text. An empty input makes no generation calls.
    pub async fn justify(
        &self,
        scored: &[ScoredJournalist],
        press_releases: &[PressRelease],
    ) -> RankingResult<Vec<Journalist>> {
        if scored.is_empty() {
            return Ok(Vec::new());
        }

        let context = build_context(press_releases);
        let requests = scored
            .iter()
            .map(|journalist| self.motivate(&context, journalist));

        let journalists = try_join_all(requests).await?;

        debug!(
            generator = self.generator.name(),
            count = journalists.len(),
            "Generated motivations"
        );

        Ok(journalists)
    }

    async fn motivate(
        &self,
        context: &str,
        journalist: &ScoredJournalist,
    ) -> RankingResult<Journalist> {
        let prompt = build_prompt(context, &journalist.email, journalist.relevance_score);
        let mut request = CompletionRequest::new(prompt).with_max_tokens(self.max_tokens);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let response = tokio::time::timeout(self.timeout, self.generator.complete(&request))
            .await
            .map_err(|_| {
                warn!(email = %journalist.email, "Motivation generation timed out");
                RankingError::GenerationTimeout {
                    email: journalist.email.clone(),
                    timeout: self.timeout,
                }
            })?
            .map_err(|source| {
                warn!(email = %journalist.email, error = %source, "Motivation generation failed");
                RankingError::GenerationFailure {
                    email: journalist.email.clone(),
                    source,
                }
            })?;

        Ok(Journalist {
            email: journalist.email.clone(),
            relevance_score: journalist.relevance_score,
            motivation: response.text.trim().to_string(),
        })
    }
}
