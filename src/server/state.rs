//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::chat::ChatClient;
use crate::config::AppConfig;
use crate::feeds::FeedService;

/// Shared application state.
pub struct AppState {
    /// Application configuration.
    pub config: AppConfig,
    /// Feed fetcher with its cache.
    pub feeds: FeedService,
    /// Client for the chat-completions API.
    pub chat: ChatClient,
}

impl AppState {
    /// Create a new application state from configuration.
    ///
    /// # Errors
    /// Returns an error if either HTTP client cannot be created.
    pub fn new(config: AppConfig) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let feeds = FeedService::new(config.feeds.clone())
            .map_err(|e| format!("Failed to create feed service: {e}"))?;
        let chat = ChatClient::new(config.llm.clone())
            .map_err(|e| format!("Failed to create chat client: {e}"))?;

        Ok(Arc::new(Self {
            config,
            feeds,
            chat,
        }))
    }
}
