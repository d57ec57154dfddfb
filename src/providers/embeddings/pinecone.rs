//! Pinecone Inference embedding provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::traits::{EmbeddingError, EmbeddingProvider, EmbeddingResult, InputType};
use crate::domain::EmbeddingVector;
use crate::providers::pinecone::{build_headers, read_failure, PINECONE_API_URL};

/// Default multilingual model; emits 1024-dimensional vectors.
pub const DEFAULT_EMBEDDING_MODEL: &str = "multilingual-e5-large";

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    parameters: EmbedParameters,
    inputs: Vec<EmbedInput<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedParameters {
    input_type: InputType,
    truncate: &'static str,
}

#[derive(Debug, Serialize)]
struct EmbedInput<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    #[serde(default)]
    values: Option<Vec<f32>>,
}

impl EmbedResponse {
    fn into_vectors(self, expected_len: usize) -> EmbeddingResult<Vec<EmbeddingVector>> {
        if self.data.len() != expected_len {
            return Err(EmbeddingError::InvalidResponse(format!(
                "Pinecone returned {} embeddings for {} inputs",
                self.data.len(),
                expected_len
            )));
        }

        self.data
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                d.values.map(EmbeddingVector::new).ok_or_else(|| {
                    EmbeddingError::InvalidResponse(format!("embedding {} has no dense values", i))
                })
            })
            .collect()
    }
}

/// Embedding provider backed by Pinecone's hosted inference API.
pub struct PineconeEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl PineconeEmbedder {
    /// Creates a provider against the public Pinecone API.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(PINECONE_API_URL, api_key, model)
    }

    /// Creates a provider against a custom base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn build_request<'a>(&'a self, texts: &'a [String], input_type: InputType) -> EmbedRequest<'a> {
        EmbedRequest {
            model: &self.model,
            parameters: EmbedParameters {
                input_type,
                truncate: "END",
            },
            inputs: texts.iter().map(|t| EmbedInput { text: t }).collect(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for PineconeEmbedder {
    fn name(&self) -> &str {
        "pinecone"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(
        &self,
        texts: &[String],
        input_type: InputType,
    ) -> EmbeddingResult<Vec<EmbeddingVector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embed", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(build_headers(&self.api_key))
            .json(&self.build_request(texts, input_type))
            .send()
            .await?;

        if !response.status().is_success() {
            let failure = read_failure(response).await;
            return Err(if failure.is_rate_limited() {
                EmbeddingError::RateLimited {
                    retry_after_secs: failure.retry_after_secs,
                }
            } else if failure.is_unauthorized() {
                EmbeddingError::AuthenticationError(failure.message)
            } else {
                EmbeddingError::ApiError {
                    status: failure.status,
                    message: failure.message,
                }
            });
        }

        let parsed: EmbedResponse = response.json().await.map_err(|e| {
            EmbeddingError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        parsed.into_vectors(texts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization() {
        let embedder = PineconeEmbedder::new("key", DEFAULT_EMBEDDING_MODEL);
        let texts = vec!["first".to_string(), "second".to_string()];
        let body = embedder.build_request(&texts, InputType::Query);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "multilingual-e5-large");
        assert_eq!(json["parameters"]["input_type"], "query");
        assert_eq!(json["parameters"]["truncate"], "END");
        assert_eq!(json["inputs"][1]["text"], "second");
    }

    #[test]
    fn response_parsing() {
        let json = r#"{
            "model": "multilingual-e5-large",
            "vector_type": "dense",
            "data": [{"values": [0.1, 0.2], "vector_type": "dense"}],
            "usage": {"total_tokens": 5}
        }"#;

        let parsed: EmbedResponse = serde_json::from_str(json).unwrap();
        let vectors = parsed.into_vectors(1).unwrap();
        assert_eq!(vectors[0].values, vec![0.1, 0.2]);
    }

    #[test]
    fn response_count_mismatch_is_invalid() {
        let json = r#"{"data": [{"values": [0.1]}]}"#;
        let parsed: EmbedResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            parsed.into_vectors(2),
            Err(EmbeddingError::InvalidResponse(_))
        ));
    }

    #[test]
    fn response_missing_values_is_invalid() {
        let json = r#"{"data": [{"vector_type": "sparse"}]}"#;
        let parsed: EmbedResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.into_vectors(1).is_err());
    }

    #[test]
    fn trailing_slash_removal() {
        let embedder = PineconeEmbedder::with_base_url("http://localhost:5080/", "k", "m");
        assert_eq!(embedder.base_url, "http://localhost:5080");
        assert_eq!(embedder.name(), "pinecone");
    }
}
