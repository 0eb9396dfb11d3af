//! Configuration for the newsbrief agent.
//!
//! Everything that used to be hard-coded in the pipelines (API key, model id,
//! feed URL list, retry budget) lives here and is passed at construction time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default chat-completions endpoint.
pub const DEFAULT_API_URL: &str = "https://api.siliconflow.cn/v1/chat/completions";

/// Default model id for chat completions.
const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-R1";

/// Default RSS sources polled by the aggregate fetch.
const DEFAULT_FEED_SOURCES: [&str; 2] = ["https://36kr.com/feed", "https://www.geekpark.net/rss"];

/// System prompt sent as the first message of every chat request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an experienced product-management \
advisor. Answer product strategy, user research, and roadmap questions with \
structured, actionable advice, citing concrete practices where possible.";

/// Top-level application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Outbound LLM API settings.
    pub llm: LlmConfig,
    /// Feed fetching and caching settings.
    pub feeds: FeedConfig,
    /// Port the HTTP server listens on.
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            feeds: FeedConfig::default(),
            port: 3000,
        }
    }
}

impl AppConfig {
    /// Build a configuration from `NEWSBRIEF_*` environment variables,
    /// falling back to defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("NEWSBRIEF_API_KEY") {
            config.llm.api_key = key;
        }
        if let Ok(model) = std::env::var("NEWSBRIEF_MODEL") {
            config.llm.model = model;
        }
        if let Ok(url) = std::env::var("NEWSBRIEF_API_URL") {
            config.llm.api_url = url;
        }
        if let Ok(feeds) = std::env::var("NEWSBRIEF_FEEDS") {
            let sources: Vec<String> = feeds
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect();
            if !sources.is_empty() {
                config.feeds.sources = sources;
            }
        }
        if let Some(port) = std::env::var("NEWSBRIEF_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            config.port = port;
        }
        config
    }
}

/// Settings for the outbound chat-completions call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Full URL of the chat-completions endpoint.
    pub api_url: String,
    /// Bearer token for the `Authorization` header.
    pub api_key: String,
    /// Model id sent with every request.
    pub model: String,
    /// Completion token budget.
    pub max_tokens: u32,
    /// System prompt prepended to every transcript.
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1000,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl LlmConfig {
    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set the endpoint URL (for API-compatible services).
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the model id.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Settings for the feed fetcher and its cache.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedConfig {
    /// RSS source URLs fetched by the aggregate operation, in output order.
    pub sources: Vec<String>,
    /// How long a cache entry is considered fresh.
    #[serde(with = "duration_serde")]
    pub cache_ttl: Duration,
    /// Maximum fetch attempts per source.
    pub max_retries: u32,
    /// Per-attempt request timeout.
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
    /// Base delay for exponential backoff between attempts.
    #[serde(with = "duration_serde")]
    pub backoff_base: Duration,
    /// Items retained per feed in the aggregate payload.
    pub max_items_per_feed: usize,
    /// Snippet length cap in the aggregate payload, in characters.
    pub snippet_max_chars: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_FEED_SOURCES.iter().map(ToString::to_string).collect(),
            cache_ttl: Duration::from_secs(300),
            max_retries: 3,
            request_timeout: Duration::from_secs(10),
            backoff_base: Duration::from_secs(1),
            max_items_per_feed: 10,
            snippet_max_chars: 200,
        }
    }
}

impl FeedConfig {
    /// Replace the source list.
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Set the cache freshness window.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the per-attempt timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the retry budget.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the backoff base delay.
    #[must_use]
    pub const fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }
}

/// Serde module for `Duration` as whole seconds.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
