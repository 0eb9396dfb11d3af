//! Error types for the feed pipeline.

use thiserror::Error;

/// Errors that can occur while fetching or parsing a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network-level failure reported by the HTTP client.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The attempt did not complete within the per-attempt timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// HTTP succeeded but the body carries no RSS/XML markers.
    #[error("response body is not an RSS/XML document")]
    InvalidFormat,

    /// The document looked like XML but did not parse as a feed.
    #[error("feed parsing error: {0}")]
    Parse(#[from] rss::Error),
}

impl FeedError {
    /// Whether the fetch loop should spend another attempt on this error.
    ///
    /// Parse failures are deterministic for a given body, so retrying the
    /// download would not help.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Parse(_))
    }
}
