//! Article domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ArticleId, EmbeddingVector, MatchMetadata};

/// A published article attributed to a journalist.
///
/// Articles are embedded once during seeding and indexed so that press
/// releases can be matched against them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier.
    #[serde(rename = "_id", default = "ArticleId::generate")]
    pub id: ArticleId,
    /// Email address of the author.
    pub journalist_email: String,
    /// Name of the outlet that published the article.
    pub outlet_name: String,
    /// Publication date as recorded by the source.
    #[serde(default)]
    pub publish_date: String,
    /// Article headline.
    pub headline: String,
    /// Body text.
    pub text: String,
    /// Stored passage embedding, once generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<EmbeddingVector>,
    /// When the embedding was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Creates an article with a generated identifier.
    pub fn new(
        journalist_email: impl Into<String>,
        outlet_name: impl Into<String>,
        headline: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: ArticleId::generate(),
            journalist_email: journalist_email.into(),
            outlet_name: outlet_name.into(),
            publish_date: String::new(),
            headline: headline.into(),
            text: text.into(),
            embedding: None,
            embedded_at: None,
        }
    }

    /// Text sent to the embedding service when indexing this article.
    pub fn embedding_input(&self) -> String {
        format!("{} - {} - {}", self.headline, self.outlet_name, self.text)
    }

    /// Metadata attached to the article's vector in the index.
    pub fn index_metadata(&self) -> MatchMetadata {
        MatchMetadata {
            article_id: Some(self.id.to_string()),
            journalist_email: Some(self.journalist_email.clone()),
            headline: Some(self.headline.clone()),
            outlet_name: Some(self.outlet_name.clone()),
            text: Some(self.text.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_input_uses_spaced_separator() {
        let article = Article::new("j@x.com", "Daily", "Headline", "Body");
        assert_eq!(article.embedding_input(), "Headline - Daily - Body");
    }

    #[test]
    fn index_metadata_carries_journalist_email() {
        let article = Article::new("j@x.com", "Daily", "Headline", "Body");
        let metadata = article.index_metadata();

        assert_eq!(metadata.journalist_email.as_deref(), Some("j@x.com"));
        assert_eq!(metadata.article_id, Some(article.id.to_string()));
        assert_eq!(metadata.outlet_name.as_deref(), Some("Daily"));
    }

    #[test]
    fn deserializes_seed_record_without_embedding() {
        let json = r#"{
            "_id": "a-1",
            "journalist_email": "j@x.com",
            "outlet_name": "Daily",
            "publish_date": "2024-01-02",
            "headline": "H",
            "text": "T"
        }"#;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id, ArticleId::from("a-1"));
        assert!(article.embedding.is_none());
    }
}
