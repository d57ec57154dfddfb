//! Pinecone serverless index client.
//!
//! Queries and upserts go to the index's own data-plane host; index
//! creation goes through the global control plane.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::traits::{IndexError, IndexResult, VectorIndex};
use crate::domain::{EmbeddingVector, SearchMatch, VectorRecord};
use crate::providers::pinecone::{build_headers, read_failure, ApiFailure, PINECONE_API_URL};

/// Upserts are split into batches of this many vectors.
const UPSERT_BATCH_SIZE: usize = 100;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<SearchMatch>,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
    deletion_protection: &'a str,
}

#[derive(Debug, Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    host: String,
}

/// Parameters for creating a serverless index.
#[derive(Debug, Clone)]
pub struct ServerlessIndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
}

impl ServerlessIndexSpec {
    /// Cosine index on AWS us-east-1.
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
        }
    }
}

fn into_index_error(failure: ApiFailure) -> IndexError {
    if failure.is_unauthorized() {
        IndexError::AuthenticationError(failure.message)
    } else {
        IndexError::ApiError {
            status: failure.status,
            message: failure.message,
        }
    }
}

/// Vector index backed by a Pinecone serverless index.
pub struct PineconeIndex {
    client: reqwest::Client,
    host: Url,
    api_key: String,
    namespace: Option<String>,
}

impl PineconeIndex {
    /// Connects to the index served at `host`.
    ///
    /// Pinecone reports hosts without a scheme; `https://` is assumed then.
    pub fn new(host: &str, api_key: impl Into<String>) -> IndexResult<Self> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(IndexError::InvalidConfig("index host is empty".to_string()));
        }
        let with_scheme = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        let host = Url::parse(&with_scheme)
            .map_err(|e| IndexError::InvalidConfig(format!("invalid index host: {}", e)))?;

        Ok(Self {
            client: reqwest::Client::new(),
            host,
            api_key: api_key.into(),
            namespace: None,
        })
    }

    /// Scopes queries and upserts to a namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    fn endpoint(&self, path: &str) -> IndexResult<Url> {
        self.host
            .join(path)
            .map_err(|e| IndexError::InvalidConfig(e.to_string()))
    }

    /// Creates a serverless index and returns its data-plane host.
    pub async fn create_serverless(
        api_key: &str,
        spec: &ServerlessIndexSpec,
    ) -> IndexResult<String> {
        Self::create_serverless_at(PINECONE_API_URL, api_key, spec).await
    }

    /// Same as [`PineconeIndex::create_serverless`] against a custom control plane URL.
    pub async fn create_serverless_at(
        control_url: &str,
        api_key: &str,
        spec: &ServerlessIndexSpec,
    ) -> IndexResult<String> {
        let url = format!("{}/indexes", control_url.trim_end_matches('/'));
        let body = CreateIndexRequest {
            name: &spec.name,
            dimension: spec.dimension,
            metric: &spec.metric,
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: &spec.cloud,
                    region: &spec.region,
                },
            },
            deletion_protection: "disabled",
        };

        let response = reqwest::Client::new()
            .post(&url)
            .headers(build_headers(api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(into_index_error(read_failure(response).await));
        }

        let description: IndexDescription = response.json().await.map_err(|e| {
            IndexError::InvalidResponse(format!("Failed to parse index description: {}", e))
        })?;
        Ok(description.host)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        "pinecone"
    }

    async fn query(
        &self,
        vector: &EmbeddingVector,
        top_k: usize,
    ) -> IndexResult<Vec<SearchMatch>> {
        let body = QueryRequest {
            vector: vector.as_slice(),
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: self.namespace.as_deref(),
        };

        let response = self
            .client
            .post(self.endpoint("query")?)
            .headers(build_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(into_index_error(read_failure(response).await));
        }

        let parsed: QueryResponse = response.json().await.map_err(|e| {
            IndexError::InvalidResponse(format!("Failed to parse query response: {}", e))
        })?;

        Ok(parsed.matches)
    }

    async fn upsert(&self, records: &[VectorRecord]) -> IndexResult<usize> {
        let mut written = 0;

        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let body = UpsertRequest {
                vectors: batch,
                namespace: self.namespace.as_deref(),
            };

            let response = self
                .client
                .post(self.endpoint("vectors/upsert")?)
                .headers(build_headers(&self.api_key))
                .json(&body)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(into_index_error(read_failure(response).await));
            }

            let parsed: UpsertResponse = response.json().await.map_err(|e| {
                IndexError::InvalidResponse(format!("Failed to parse upsert response: {}", e))
            })?;
            written += parsed.upserted_count;
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MatchMetadata;

    #[test]
    fn host_without_scheme_gets_https() {
        let index = PineconeIndex::new("example-index-abc.svc.pinecone.io", "k").unwrap();
        assert_eq!(
            index.endpoint("query").unwrap().as_str(),
            "https://example-index-abc.svc.pinecone.io/query"
        );
    }

    #[test]
    fn empty_host_is_rejected() {
        assert!(matches!(
            PineconeIndex::new("  ", "k"),
            Err(IndexError::InvalidConfig(_))
        ));
    }

    #[test]
    fn query_request_serialization() {
        let values = [0.1_f32, 0.2];
        let body = QueryRequest {
            vector: &values,
            top_k: 10,
            include_metadata: true,
            include_values: false,
            namespace: None,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["topK"], 10);
        assert_eq!(json["includeMetadata"], true);
        assert!(json.get("namespace").is_none());
    }

    #[test]
    fn query_response_parsing_keeps_incomplete_matches() {
        let json = r#"{
            "matches": [
                {"id": "a", "score": 0.91, "metadata": {"journalist_email": "j@x.com", "headline": "H"}},
                {"id": "b", "score": 0.5},
                {"id": "c", "metadata": {"journalist_email": "k@x.com"}}
            ],
            "namespace": ""
        }"#;

        let parsed: QueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.matches.len(), 3);
        assert_eq!(parsed.matches[0].journalist_email(), Some("j@x.com"));
        assert!(parsed.matches[1].metadata.is_none());
        assert!(parsed.matches[2].score.is_none());
    }

    #[test]
    fn upsert_request_serialization() {
        let records = vec![VectorRecord {
            id: "a-1".to_string(),
            values: EmbeddingVector::new(vec![1.0]),
            metadata: MatchMetadata::for_journalist("j@x.com"),
        }];
        let body = UpsertRequest {
            vectors: &records,
            namespace: Some("articles"),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["vectors"][0]["id"], "a-1");
        assert_eq!(json["vectors"][0]["values"][0], 1.0);
        assert_eq!(json["vectors"][0]["metadata"]["journalist_email"], "j@x.com");
        assert_eq!(json["namespace"], "articles");
    }

    #[test]
    fn create_index_request_serialization() {
        let spec = ServerlessIndexSpec::new("example-index", 1024);
        let body = CreateIndexRequest {
            name: &spec.name,
            dimension: spec.dimension,
            metric: &spec.metric,
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: &spec.cloud,
                    region: &spec.region,
                },
            },
            deletion_protection: "disabled",
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["dimension"], 1024);
        assert_eq!(json["spec"]["serverless"]["region"], "us-east-1");
        assert_eq!(json["deletion_protection"], "disabled");
    }
}
