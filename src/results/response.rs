//! Response body returned by the search service

use super::types::Hit;
use serde::{Deserialize, Serialize};

/// Top-level JSON body of a search response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Rank expression the service applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    /// Match expression the service evaluated
    #[serde(rename = "match-expr", default, skip_serializing_if = "Option::is_none")]
    pub match_expr: Option<String>,
    pub hits: Hits,
    #[serde(default)]
    pub info: ResponseInfo,
}

/// One page of hits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hits {
    /// Total number of matching documents
    #[serde(default)]
    pub found: u64,
    /// Offset of the first hit in this page
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub hit: Vec<Hit>,
}

/// Request diagnostics reported by the service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseInfo {
    /// Request id
    #[serde(default)]
    pub rid: Option<String>,
    #[serde(rename = "time-ms", default)]
    pub time_ms: Option<u64>,
    #[serde(rename = "cpu-time-ms", default)]
    pub cpu_time_ms: Option<u64>,
}
