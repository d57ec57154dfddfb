//! Press release domain type.

use serde::{Deserialize, Serialize};

use super::PressReleaseId;

/// A press release published by a newsroom.
///
/// Press releases are read-only input to the ranking pipeline; they are
/// owned by the document store and never modified after being fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressRelease {
    /// Unique identifier.
    #[serde(rename = "_id", default = "PressReleaseId::generate")]
    pub id: PressReleaseId,
    /// Name of the publishing newsroom.
    pub newsroom: String,
    /// Publication date as recorded by the source.
    #[serde(default)]
    pub publish_date: String,
    /// Release headline.
    pub headline: String,
    /// Body text.
    pub text: String,
}

impl PressRelease {
    /// Creates a press release with a generated identifier.
    pub fn new(
        newsroom: impl Into<String>,
        headline: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: PressReleaseId::generate(),
            newsroom: newsroom.into(),
            publish_date: String::new(),
            headline: headline.into(),
            text: text.into(),
        }
    }

    /// Text sent to the embedding service when this release is used as a query.
    pub fn embedding_input(&self) -> String {
        format!("{}-{}-{}", self.headline, self.newsroom, self.text)
    }

    /// One-line rendering used as context in generation prompts.
    pub fn prompt_line(&self) -> String {
        format!("{} - {}: {}", self.headline, self.newsroom, self.text)
    }
}
