//! Result handling module
//!
//! Typed views over the JSON the search service returns.

mod response;
mod types;

pub use response::{Hits, ResponseInfo, SearchResponse};
pub use types::{Hit, HitId, Record};
