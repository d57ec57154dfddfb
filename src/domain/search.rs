//! Nearest-neighbor match types.
//!
//! Index records written before the current metadata schema may lack a
//! journalist email or carry it with the wrong JSON type, so every
//! metadata field is optional and non-string values decode as `None`.

use serde::{Deserialize, Deserializer, Serialize};

use super::EmbeddingVector;

/// Metadata stored alongside each article vector in the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    /// Identifier of the source article.
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub article_id: Option<String>,
    /// Email of the journalist who wrote the article.
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub journalist_email: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub headline: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub outlet_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,
}

impl MatchMetadata {
    /// Creates metadata carrying only a journalist email.
    pub fn for_journalist(email: impl Into<String>) -> Self {
        Self {
            journalist_email: Some(email.into()),
            ..Default::default()
        }
    }
}

/// A single scored match returned by a nearest-neighbor query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Identifier of the matched vector.
    pub id: String,
    /// Similarity to the query vector, when the index reported one.
    #[serde(default)]
    pub score: Option<f64>,
    /// Attached metadata, when requested and present.
    #[serde(default)]
    pub metadata: Option<MatchMetadata>,
}

impl SearchMatch {
    /// Creates a match with a score and a journalist email.
    pub fn new(id: impl Into<String>, score: f64, journalist_email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            score: Some(score),
            metadata: Some(MatchMetadata::for_journalist(journalist_email)),
        }
    }

    /// Returns the journalist email, if the metadata carries one.
    pub fn journalist_email(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.journalist_email.as_deref())
    }
}

/// A vector with metadata, as written to the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: EmbeddingVector,
    pub metadata: MatchMetadata,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_ignores_non_string_email() {
        let json = r#"{"journalist_email": 42, "headline": "H"}"#;
        let metadata: MatchMetadata = serde_json::from_str(json).unwrap();

        assert!(metadata.journalist_email.is_none());
        assert_eq!(metadata.headline.as_deref(), Some("H"));
    }

    #[test]
    fn match_without_score_or_metadata() {
        let json = r#"{"id": "a-1"}"#;
        let m: SearchMatch = serde_json::from_str(json).unwrap();

        assert!(m.score.is_none());
        assert!(m.journalist_email().is_none());
    }

    #[test]
    fn match_constructor_sets_email() {
        let m = SearchMatch::new("a-1", 0.9, "j@x.com");
        assert_eq!(m.journalist_email(), Some("j@x.com"));
        assert_eq!(m.score, Some(0.9));
    }

    #[test]
    fn metadata_serializes_article_id_as_underscore_id() {
        let metadata = MatchMetadata {
            article_id: Some("a-1".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"_id":"a-1"}"#);
    }
}
