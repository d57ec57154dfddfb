//! Shared plumbing for Pinecone's REST APIs.
//!
//! Inference (`/embed`), control plane (`/indexes`) and the per-index data
//! plane all authenticate with the same `Api-Key` header and report errors
//! with the same JSON envelope.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;

/// Base URL for Pinecone's global (inference and control plane) API.
pub const PINECONE_API_URL: &str = "https://api.pinecone.io";

/// API version pinned on every request.
pub const PINECONE_API_VERSION: &str = "2024-10";

/// Error envelope returned by Pinecone.
#[derive(Debug, Deserialize)]
struct PineconeErrorBody {
    error: PineconeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct PineconeErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Decoded non-success response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiFailure {
    pub status: u16,
    pub message: String,
    pub retry_after_secs: Option<u64>,
}

impl ApiFailure {
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Builds the default headers for a Pinecone request.
pub(crate) fn build_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        "X-Pinecone-API-Version",
        HeaderValue::from_static(PINECONE_API_VERSION),
    );
    if let Ok(value) = HeaderValue::from_str(api_key.trim()) {
        headers.insert("Api-Key", value);
    }
    headers
}

/// Reads the status and error message out of a failed response.
pub(crate) async fn read_failure(response: reqwest::Response) -> ApiFailure {
    let status = response.status().as_u16();
    let retry_after_secs = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());

    let message = match response.json::<PineconeErrorBody>().await {
        Ok(body) => match body.error.code {
            Some(code) => format!("{}: {}", code, body.error.message),
            None => body.error.message,
        },
        Err(_) => format!("HTTP {}", status),
    };

    ApiFailure {
        status,
        message,
        retry_after_secs,
    }
}
