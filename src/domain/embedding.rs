//! Embedding vector type.

use serde::{Deserialize, Serialize};

/// A vector embedding representing text semantics.
///
/// Produced by the embedding service; the production model emits
/// 1024-dimensional vectors but nothing here depends on that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingVector {
    /// The embedding values.
    pub values: Vec<f32>,
}

impl EmbeddingVector {
    /// Creates a new embedding from a vector of values.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Returns the dimensionality of this embedding.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Returns the raw values.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Computes cosine similarity with another embedding.
    ///
    /// Returns a value between -1.0 and 1.0, where 1.0 means identical.
    /// Mismatched dimensions or zero vectors score 0.0.
    pub fn cosine_similarity(&self, other: &EmbeddingVector) -> f32 {
        if self.values.len() != other.values.len() {
            return 0.0;
        }

        let dot: f32 = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum();

        let norm_a: f32 = self.values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = other.values.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}
