//! Time-boxed in-memory cache for parsed feeds.
//!
//! The cache is an explicit component injected into the fetch service, keyed
//! by source URL. Entries are refreshed on successful fetches and never
//! evicted: a stale entry is still worth serving when a refresh fails.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::feeds::parse::ParsedFeed;

/// Cache entry with its insertion timestamp.
#[derive(Clone)]
struct CacheEntry {
    feed: ParsedFeed,
    fetched_at: Instant,
}

/// Thread-safe feed cache with a freshness window.
pub struct FeedCache {
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
}

impl FeedCache {
    /// Create a cache whose entries are fresh for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Get the entry for `url` if it is younger than the freshness window.
    #[must_use]
    pub fn fresh(&self, url: &str) -> Option<ParsedFeed> {
        self.entries.get(url).and_then(|entry| {
            if entry.fetched_at.elapsed() < self.ttl {
                Some(entry.feed.clone())
            } else {
                None
            }
        })
    }

    /// Get the entry for `url` regardless of age (fallback path).
    #[must_use]
    pub fn any(&self, url: &str) -> Option<ParsedFeed> {
        self.entries.get(url).map(|entry| entry.feed.clone())
    }

    /// Insert or refresh the entry for `url` with the current timestamp.
    pub fn insert(&self, url: &str, feed: ParsedFeed) {
        self.entries.insert(
            url.to_string(),
            CacheEntry {
                feed,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Number of cached sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
