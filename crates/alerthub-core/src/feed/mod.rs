//! Community feed: news, events, weather, safe places and incident alerts
//! sourced from a third-party search provider.
//!
//! The provider is a port (`SearchProvider`) that takes a flat parameter map
//! and returns the raw JSON document. Mapping those documents into feed items
//! happens here so it can be tested against canned responses.

pub mod classify;
pub mod monitor;
pub mod service;

use std::collections::BTreeMap;

use alerthub_types::error::SearchError;

pub use service::FeedService;

/// Query parameters for one search call. Ordered so that equal parameter sets
/// produce the same cache key.
pub type SearchParams = BTreeMap<String, String>;

/// A search backend answering parameterized queries with a JSON document.
///
/// Implementations live in alerthub-infra (`SerpApiClient`, plus a caching
/// wrapper).
pub trait SearchProvider: Send + Sync {
    fn search(
        &self,
        params: &SearchParams,
    ) -> impl std::future::Future<Output = Result<serde_json::Value, SearchError>> + Send;
}
