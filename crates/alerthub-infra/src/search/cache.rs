//! TTL cache in front of a [`SearchProvider`].
//!
//! Only successful documents are cached. Entries are keyed by the parameter
//! map itself, so two feed calls that build identical queries share one
//! upstream request per TTL window. Inserts sweep expired entries and evict
//! the oldest ones past the size cap.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use alerthub_core::feed::{SearchParams, SearchProvider};
use alerthub_types::error::SearchError;

/// Upper bound on cached documents unless overridden.
pub const DEFAULT_MAX_ENTRIES: usize = 512;

pub struct CachingSearchProvider<P> {
    inner: P,
    ttl: Duration,
    max_entries: usize,
    entries: DashMap<SearchParams, (Instant, serde_json::Value)>,
}

impl<P: SearchProvider> CachingSearchProvider<P> {
    /// A zero `ttl` disables caching; every call goes to `inner`.
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
            entries: DashMap::new(),
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, params: &SearchParams) -> Option<serde_json::Value> {
        let hit = self.entries.get(params)?;
        let (stored_at, value) = hit.value();
        if stored_at.elapsed() < self.ttl {
            return Some(value.clone());
        }
        drop(hit);
        self.entries.remove(params);
        None
    }

    /// Drop expired entries, then the oldest ones until there is room for
    /// one more.
    fn make_room(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);

        while self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().0)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl<P: SearchProvider> SearchProvider for CachingSearchProvider<P> {
    async fn search(&self, params: &SearchParams) -> Result<serde_json::Value, SearchError> {
        if self.ttl.is_zero() {
            return self.inner.search(params).await;
        }

        if let Some(value) = self.lookup(params) {
            tracing::trace!(engine = ?params.get("engine"), "search cache hit");
            return Ok(value);
        }

        let value = self.inner.search(params).await?;
        self.make_room();
        self.entries
            .insert(params.clone(), (Instant::now(), value.clone()));
        Ok(value)
    }
}
