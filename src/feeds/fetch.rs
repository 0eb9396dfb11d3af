//! Raw feed download with bounded retries and exponential backoff.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};

use crate::config::FeedConfig;
use crate::feeds::error::FeedError;

const FEED_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const FEED_ACCEPT: &str = "application/rss+xml,application/xml,application/atom+xml,application/json";
const FEED_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Build the HTTP client used for feed downloads.
///
/// # Errors
/// Returns [`FeedError::Transport`] if the client cannot be constructed.
pub fn build_client() -> Result<Client, FeedError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(FEED_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(FEED_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(FEED_ACCEPT_LANGUAGE));

    let client = Client::builder()
        .default_headers(headers)
        .gzip(true)
        .build()?;

    Ok(client)
}

/// Download the raw document for `url`, retrying up to the configured budget.
///
/// Each attempt is bounded by the per-attempt timeout; between failed
/// attempts the loop sleeps `backoff_base * 2^attempt`. After exhausting the
/// budget the last error is returned.
///
/// # Errors
/// Returns the error of the final attempt.
pub async fn fetch_raw(client: &Client, url: &str, config: &FeedConfig) -> Result<String, FeedError> {
    // A zero retry budget would mean "never try at all"; clamp to one
    // attempt so the error returned is always a real one.
    let attempts = config.max_retries.max(1);
    let mut attempt = 0;

    loop {
        let err = match try_fetch(client, url, config.request_timeout).await {
            Ok(body) => return Ok(body),
            Err(err) => err,
        };
        tracing::warn!(url, attempt, error = %err, "feed fetch attempt failed");
        if !err.is_retryable() || attempt + 1 >= attempts {
            return Err(err);
        }
        tokio::time::sleep(backoff_delay(config.backoff_base, attempt)).await;
        attempt += 1;
    }
}

/// Exponential backoff delay for the given zero-based attempt index.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.saturating_pow(attempt)
}

async fn try_fetch(client: &Client, url: &str, timeout: Duration) -> Result<String, FeedError> {
    let response = tokio::time::timeout(timeout, client.get(url).send())
        .await
        .map_err(|_| FeedError::Timeout)??;

    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::HttpStatus(status));
    }

    let body = tokio::time::timeout(timeout, response.text())
        .await
        .map_err(|_| FeedError::Timeout)??;

    // An HTTP 200 that is not actually a feed (login page, HTML error page)
    // counts as a failed attempt.
    if !body.contains("<?xml") && !body.contains("<rss") {
        return Err(FeedError::InvalidFormat);
    }

    Ok(body)
}
