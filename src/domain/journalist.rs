//! Journalist scoring types.

use serde::{Deserialize, Serialize};

/// Running relevance accumulator for one journalist.
///
/// Only exists during a single aggregation pass. An accumulator is created
/// on the first match attributed to a journalist, so `count` is at least 1
/// for every entry that reaches the final mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JournalistScore {
    /// Sum of similarity scores seen so far.
    pub total_score: f64,
    /// Number of matches folded in.
    pub count: u32,
}

impl JournalistScore {
    /// Folds one match score into the accumulator.
    pub fn record(&mut self, score: f64) {
        self.total_score += score;
        self.count += 1;
    }

    /// Arithmetic mean of the recorded scores.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_score / f64::from(self.count)
        }
    }
}

/// A recommended journalist, the terminal output of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journalist {
    /// Journalist's email address.
    pub email: String,
    /// Mean similarity of the journalist's matched articles (nominally 0..=1).
    pub relevance_score: f64,
    /// Generated explanation of why the journalist is relevant.
    pub motivation: String,
}
