//! Error types for Inquisitio-RS

use thiserror::Error;

/// Errors produced while building, issuing or reading a search
#[derive(Debug, Error)]
pub enum Error {
    /// No query text and no filter clauses to search with
    #[error("Query is nil")]
    InvalidQuery,

    /// The search service answered with something other than 200
    #[error("Search failed with status code {status}")]
    SearchRequest { status: u16, body: String },

    /// Network-level failure reported by the transport
    #[error(transparent)]
    Transport(#[from] anyhow::Error),

    /// Response body did not have the expected JSON shape
    #[error("failed to parse search response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A hit is missing a field required by a derived view
    #[error("hit {index} has no usable '{field}' field")]
    MalformedResult { index: usize, field: &'static str },

    /// Derived views were requested before a successful search
    #[error("search has not been run")]
    NotSearched,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
