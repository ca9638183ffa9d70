//! Search provider adapters for the community feed.

pub mod cache;
pub mod serpapi;

pub use cache::CachingSearchProvider;
pub use serpapi::SerpApiClient;
