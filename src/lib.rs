//! Inquisitio-RS: query builder and result mapper for a hosted search service
//!
//! Builds `q=` / `bq=` search URLs from free text and field filters, issues
//! the request through a [`network::Transport`], and maps the JSON hits into
//! typed results with `ids` and `records` views.

pub mod config;
pub mod error;
pub mod network;
pub mod query;
pub mod results;
pub mod search;

pub use config::Settings;
pub use error::{Error, Result};
pub use network::{HttpClient, Transport, TransportResponse};
pub use query::{FilterValue, Filters, QueryBuilder, QueryMode};
pub use results::{Hit, HitId, Record};
pub use search::{SearchClient, SearchOptions, SearchParameters, Searcher};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Search API version segment of every request path
pub const API_VERSION: &str = "2011-02-01";
