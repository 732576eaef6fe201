//! Search orchestration module
//!
//! Holds the parameters of a search, issues the request and exposes the
//! hits and the views derived from them.

mod models;
mod searcher;

pub use models::*;
pub use searcher::{SearchClient, Searcher};
