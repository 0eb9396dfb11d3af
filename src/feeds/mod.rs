//! RSS aggregation pipeline.
//!
//! Fetches a configured set of feed sources concurrently, each with bounded
//! retries and a short-lived cache, and shapes the survivors into digest
//! payloads and a summarization prompt.

pub mod cache;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod prompt;

pub use cache::FeedCache;
pub use error::FeedError;
pub use parse::{FeedItem, ParsedFeed};
pub use prompt::format_digest_prompt;

use std::sync::Arc;

use futures::future;
use serde::{Deserialize, Serialize};

use crate::config::FeedConfig;

/// A feed shaped for the aggregate payload: item count capped and snippets
/// truncated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedDigest {
    /// Channel title.
    pub title: String,
    /// Channel description.
    pub description: String,
    /// Channel link.
    pub link: String,
    /// Capped, truncated items in document order.
    pub items: Vec<DigestItem>,
}

/// A single item of a [`FeedDigest`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestItem {
    /// Entry title.
    pub title: String,
    /// Entry link.
    pub link: String,
    /// Publication date as given by the feed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    /// Entry author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Summary truncated to the configured character cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_snippet: Option<String>,
}

/// Fetches and caches the configured feed sources.
pub struct FeedService {
    client: reqwest::Client,
    cache: Arc<FeedCache>,
    config: FeedConfig,
}

impl FeedService {
    /// Create a service owning a fresh cache.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let cache = Arc::new(FeedCache::new(config.cache_ttl));
        Self::with_cache(config, cache)
    }

    /// Create a service over an injected cache (shared or pre-seeded).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_cache(config: FeedConfig, cache: Arc<FeedCache>) -> Result<Self, FeedError> {
        let client = fetch::build_client()?;
        Ok(Self {
            client,
            cache,
            config,
        })
    }

    /// The cache backing this service.
    #[must_use]
    pub fn cache(&self) -> &Arc<FeedCache> {
        &self.cache
    }

    /// Fetch one source, preferring a fresh cache entry, degrading to a stale
    /// entry when the network fails, and yielding `None` only when there is
    /// nothing to serve at all.
    pub async fn fetch_feed(&self, url: &str) -> Option<ParsedFeed> {
        if let Some(feed) = self.cache.fresh(url) {
            tracing::debug!(url, "feed cache hit");
            return Some(feed);
        }

        match self.fetch_and_parse(url).await {
            Ok(feed) => {
                self.cache.insert(url, feed.clone());
                Some(feed)
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "feed fetch failed, falling back to cache");
                self.cache.any(url)
            }
        }
    }

    async fn fetch_and_parse(&self, url: &str) -> Result<ParsedFeed, FeedError> {
        let raw = fetch::fetch_raw(&self.client, url, &self.config).await?;
        parse::parse_feed(&raw)
    }

    /// Fetch every configured source concurrently and shape the survivors
    /// into digests, preserving the configured source order. A failing source
    /// is simply absent from the result.
    pub async fn fetch_all(&self) -> Vec<FeedDigest> {
        let fetches = self.config.sources.iter().map(|url| self.fetch_feed(url));
        let results = future::join_all(fetches).await;

        results
            .into_iter()
            .flatten()
            .map(|feed| self.digest(feed))
            .collect()
    }

    fn digest(&self, feed: ParsedFeed) -> FeedDigest {
        let items = feed
            .items
            .into_iter()
            .take(self.config.max_items_per_feed)
            .map(|item| DigestItem {
                title: item.title,
                link: item.link,
                pub_date: item.pub_date,
                author: item.author,
                content_snippet: item
                    .content_snippet
                    .map(|s| truncate_snippet(&s, self.config.snippet_max_chars)),
            })
            .collect();

        FeedDigest {
            title: feed.title,
            description: feed.description,
            link: feed.link,
            items,
        }
    }
}

/// Truncate `text` to at most `max` characters, appending an ellipsis when
/// anything was cut.
fn truncate_snippet(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max).collect();
    truncated.push_str("...");
    truncated
}
