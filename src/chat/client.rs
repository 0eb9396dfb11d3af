//! HTTP client for the streaming chat-completions API.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::chat::error::ChatError;
use crate::chat::stream::{StreamOutcome, read_token_stream};
use crate::config::LlmConfig;

/// One role/content pair of the outbound request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user`, or `assistant`.
    pub role: String,
    /// Message text.
    pub content: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    max_tokens: u32,
}

/// Client for the chat-completions endpoint configured in [`LlmConfig`].
pub struct ChatClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ChatClient {
    /// Create a client for the configured endpoint.
    ///
    /// # Errors
    /// Returns [`ChatError::Request`] if the HTTP client cannot be built.
    pub fn new(config: LlmConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, config })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Send the transcript and stream decoded tokens to `sink` in arrival
    /// order. Suspends only on chunk reads, which are raced against `cancel`.
    ///
    /// # Errors
    /// Returns [`ChatError::Upstream`] on a non-success status,
    /// [`ChatError::Request`] on transport failure, and [`ChatError::Stream`]
    /// if the body breaks mid-stream.
    pub async fn stream_chat<F>(
        &self,
        messages: &[ChatMessage],
        cancel: &CancellationToken,
        sink: F,
    ) -> Result<StreamOutcome, ChatError>
    where
        F: FnMut(&str),
    {
        let request = CompletionRequest {
            model: &self.config.model,
            messages,
            stream: true,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Upstream { status });
        }

        read_token_stream(response.bytes_stream(), cancel, sink).await
    }
}
