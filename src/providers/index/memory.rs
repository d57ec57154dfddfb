//! In-memory vector index.
//!
//! Stores records in process and answers queries by exhaustive cosine
//! similarity. Useful for local runs and for exercising the pipeline
//! without a hosted index.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{IndexError, IndexResult, VectorIndex};
use crate::domain::{EmbeddingVector, SearchMatch, VectorRecord};

/// In-memory vector index with similarity search.
///
/// Records are keyed by id; ties in similarity are broken by id so query
/// results are deterministic.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    records: RwLock<BTreeMap<String, VectorRecord>>,
}

impl MemoryIndex {
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns whether the index is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    fn name(&self) -> &str {
        "memory"
    }

    async fn query(
        &self,
        vector: &EmbeddingVector,
        top_k: usize,
    ) -> IndexResult<Vec<SearchMatch>> {
        let records = self.records.read().await;

        if let Some(first) = records.values().next() {
            if first.values.dimension() != vector.dimension() {
                return Err(IndexError::DimensionMismatch {
                    expected: first.values.dimension(),
                    actual: vector.dimension(),
                });
            }
        }

        let mut scored: Vec<(&VectorRecord, f32)> = records
            .values()
            .map(|record| (record, vector.cosine_similarity(&record.values)))
            .collect();

        // Stable sort keeps id order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(record, score)| SearchMatch {
                id: record.id.clone(),
                score: Some(f64::from(score)),
                metadata: Some(record.metadata.clone()),
            })
            .collect())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> IndexResult<usize> {
        let mut stored = self.records.write().await;

        let expected = stored
            .values()
            .next()
            .map(|r| r.values.dimension())
            .or_else(|| records.first().map(|r| r.values.dimension()));

        if let Some(expected) = expected {
            if let Some(bad) = records.iter().find(|r| r.values.dimension() != expected) {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: bad.values.dimension(),
                });
            }
        }

        for record in records {
            stored.insert(record.id.clone(), record.clone());
        }

        Ok(records.len())
    }
}
