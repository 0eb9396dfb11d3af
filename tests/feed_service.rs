//! Integration tests for the feed fetcher: retry budget, backoff, cache
//! behavior, and aggregate shaping, driven against a local mock server.

use std::time::Duration;

use newsbrief_agent::config::FeedConfig;
use newsbrief_agent::feeds::FeedService;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rss_body(title: &str, items: usize, snippet_len: usize) -> String {
    let mut body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\"><channel>\
         <title>{title}</title><description>test feed</description>\
         <link>https://example.com</link>"
    );
    for index in 0..items {
        let snippet = "x".repeat(snippet_len);
        body.push_str(&format!(
            "<item><title>item {index}</title>\
             <link>https://example.com/{index}</link>\
             <description>{snippet}</description></item>"
        ));
    }
    body.push_str("</channel></rss>");
    body
}

fn fast_config(sources: Vec<String>) -> FeedConfig {
    FeedConfig::default()
        .with_sources(sources)
        .with_request_timeout(Duration::from_millis(250))
        .with_backoff_base(Duration::from_millis(10))
}

#[tokio::test]
async fn fresh_cache_entry_skips_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body("cached", 1, 10)))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/feed", server.uri());
    let service = FeedService::new(fast_config(vec![url.clone()])).unwrap();

    let first = service.fetch_feed(&url).await.unwrap();
    // Second fetch must be served from cache: the mock allows one request.
    let second = service.fetch_feed(&url).await.unwrap();

    assert_eq!(first.title, "cached");
    assert_eq!(second.title, "cached");
    server.verify().await;
}

#[tokio::test]
async fn non_xml_success_body_consumes_the_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not a feed</html>"))
        .expect(3)
        .mount(&server)
        .await;

    let url = format!("{}/feed", server.uri());
    let service = FeedService::new(fast_config(vec![url.clone()])).unwrap();

    assert!(service.fetch_feed(&url).await.is_none());
    server.verify().await;
}

#[tokio::test]
async fn exhausted_source_is_absent_while_others_survive() {
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&broken)
        .await;

    let healthy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body("healthy", 2, 10)))
        .mount(&healthy)
        .await;

    let sources = vec![
        format!("{}/feed", broken.uri()),
        format!("{}/feed", healthy.uri()),
    ];
    let service = FeedService::new(fast_config(sources)).unwrap();

    let digests = service.fetch_all().await;
    assert_eq!(digests.len(), 1);
    assert_eq!(digests[0].title, "healthy");
    broken.verify().await;
}

#[tokio::test]
async fn stale_cache_entry_serves_as_fallback_after_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body("remembered", 1, 10)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let url = format!("{}/feed", server.uri());
    // Zero TTL: the entry written by the first fetch is immediately stale.
    let config = fast_config(vec![url.clone()]).with_cache_ttl(Duration::ZERO);
    let service = FeedService::new(config).unwrap();

    assert!(service.fetch_feed(&url).await.is_some());

    // Refresh fails on every attempt; the stale entry is still served.
    let fallback = service.fetch_feed(&url).await.unwrap();
    assert_eq!(fallback.title, "remembered");
}

#[tokio::test]
async fn transient_failure_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body("recovered", 1, 10)))
        .mount(&server)
        .await;

    let url = format!("{}/feed", server.uri());
    let service = FeedService::new(fast_config(vec![url.clone()])).unwrap();

    let feed = service.fetch_feed(&url).await.unwrap();
    assert_eq!(feed.title, "recovered");
}

#[tokio::test]
async fn zero_retry_budget_still_performs_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body("once", 1, 10)))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/feed", server.uri());
    let config = fast_config(vec![url.clone()]).with_max_retries(0);
    let service = FeedService::new(config).unwrap();

    let feed = service.fetch_feed(&url).await.unwrap();
    assert_eq!(feed.title, "once");
    server.verify().await;
}

#[tokio::test]
async fn aggregate_caps_items_and_truncates_snippets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body("big", 12, 450)))
        .mount(&server)
        .await;

    let url = format!("{}/feed", server.uri());
    let service = FeedService::new(fast_config(vec![url])).unwrap();

    let digests = service.fetch_all().await;
    assert_eq!(digests.len(), 1);
    assert_eq!(digests[0].items.len(), 10);

    let snippet = digests[0].items[0].content_snippet.as_deref().unwrap();
    assert_eq!(snippet.chars().count(), 203);
    assert!(snippet.ends_with("..."));
}

#[tokio::test]
async fn slow_source_times_out_then_recovers_while_fast_source_is_unaffected() {
    let slow = MockServer::start().await;
    // First response outlives the per-attempt timeout, so the attempt is
    // aborted and retried.
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss_body("slow", 1, 10))
                .set_delay(Duration::from_secs(2)),
        )
        .up_to_n_times(1)
        .mount(&slow)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body("slow", 1, 10)))
        .mount(&slow)
        .await;

    let fast = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body("fast", 1, 10)))
        .expect(1)
        .mount(&fast)
        .await;

    let sources = vec![
        format!("{}/feed", slow.uri()),
        format!("{}/feed", fast.uri()),
    ];
    let service = FeedService::new(fast_config(sources)).unwrap();

    let digests = service.fetch_all().await;
    // Both present, configured source order preserved.
    assert_eq!(digests.len(), 2);
    assert_eq!(digests[0].title, "slow");
    assert_eq!(digests[1].title, "fast");
    fast.verify().await;
}
