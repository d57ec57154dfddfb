//! Deterministic aggregation steps of the ranking pipeline.
//!
//! - [`mean_pool`] folds several press release embeddings into one query vector.
//! - [`aggregate_scores`] folds nearest-neighbor matches into a mean
//!   relevance score per journalist.

use std::collections::HashMap;

use crate::domain::{EmbeddingVector, JournalistScore, SearchMatch};

use super::error::{RankingError, RankingResult};

/// Averages vectors coordinate by coordinate.
///
/// All inputs must share the dimensionality of the first one and hold only
/// finite values. A single input is returned unchanged.
pub fn mean_pool(vectors: &[EmbeddingVector]) -> RankingResult<EmbeddingVector> {
    let first = vectors
        .first()
        .ok_or_else(|| RankingError::InvalidInput("no vectors to pool".to_string()))?;
    let dimension = first.dimension();

    if dimension == 0 {
        return Err(RankingError::InvalidInput(
            "vectors have no coordinates".to_string(),
        ));
    }

    let mut sums = vec![0.0_f64; dimension];
    for (i, vector) in vectors.iter().enumerate() {
        if vector.dimension() != dimension {
            return Err(RankingError::InvalidInput(format!(
                "vector {} has dimension {}, expected {}",
                i,
                vector.dimension(),
                dimension
            )));
        }
        for (sum, value) in sums.iter_mut().zip(vector.as_slice()) {
            if !value.is_finite() {
                return Err(RankingError::InvalidInput(format!(
                    "vector {} has a non-finite coordinate",
                    i
                )));
            }
            *sum += f64::from(*value);
        }
    }

    if vectors.len() == 1 {
        return Ok(first.clone());
    }

    let count = vectors.len() as f64;
    Ok(EmbeddingVector::new(
        sums.into_iter().map(|sum| (sum / count) as f32).collect(),
    ))
}

/// A journalist with a computed relevance score, before justification.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredJournalist {
    pub email: String,
    pub relevance_score: f64,
}

/// Per-journalist scores from one aggregation pass.
///
/// Journalists are kept in order of first appearance among the matches.
#[derive(Debug, Clone, Default)]
pub struct ScoreAggregation {
    entries: Vec<(String, JournalistScore)>,
    positions: HashMap<String, usize>,
    skipped: usize,
}

impl ScoreAggregation {
    fn record(&mut self, email: &str, score: f64) {
        match self.positions.get(email) {
            Some(&pos) => self.entries[pos].1.record(score),
            None => {
                let mut accumulator = JournalistScore::default();
                accumulator.record(score);
                self.positions.insert(email.to_string(), self.entries.len());
                self.entries.push((email.to_string(), accumulator));
            }
        }
    }

    /// Number of matches ignored for lacking a journalist email or a score.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of distinct journalists scored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw accumulator for a journalist.
    pub fn accumulator(&self, email: &str) -> Option<&JournalistScore> {
        self.positions.get(email).map(|&pos| &self.entries[pos].1)
    }

    /// Mean relevance for a journalist.
    pub fn relevance(&self, email: &str) -> Option<f64> {
        self.accumulator(email).map(JournalistScore::mean)
    }

    /// Scored journalists in first-appearance order.
    pub fn journalists(&self) -> Vec<ScoredJournalist> {
        self.entries
            .iter()
            .map(|(email, score)| ScoredJournalist {
                email: email.clone(),
                relevance_score: score.mean(),
            })
            .collect()
    }
}

/// Computes the mean similarity per journalist email.
///
/// Matches without a string journalist email or without a numeric score are
/// skipped and counted, not treated as errors. No normalization across
/// journalists is applied.
pub fn aggregate_scores(matches: &[SearchMatch]) -> ScoreAggregation {
    let mut aggregation = ScoreAggregation::default();

    for m in matches {
        match (m.journalist_email(), m.score) {
            (Some(email), Some(score)) if score.is_finite() => aggregation.record(email, score),
            _ => aggregation.skipped += 1,
        }
    }

    aggregation
}
