//! Transport abstraction used by the searcher

use async_trait::async_trait;
use std::collections::HashMap;

/// HTTP response handed back by a transport
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl TransportResponse {
    /// Response with the given status and body and no headers
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            text: text.into(),
            url: String::new(),
        }
    }

    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.text)
    }

    /// The search service only signals success with exactly 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Issues GET requests on behalf of a searcher.
///
/// Timeouts and connection handling belong to the implementation; errors
/// are passed through to the caller untouched.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> anyhow::Result<TransportResponse>;
}
