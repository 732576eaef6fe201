//! HTTP networking module
//!
//! Provides the transport the searcher talks through and its reqwest implementation.

mod client;
mod transport;

pub use client::HttpClient;
pub use transport::{Transport, TransportResponse};
