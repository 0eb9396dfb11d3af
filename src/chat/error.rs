//! Error types for the chat pipeline.

use thiserror::Error;

/// Errors that can occur during a chat completion.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The request could not be sent or the connection failed.
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The chat API answered with a non-success status.
    #[error("chat API returned status {status}")]
    Upstream {
        /// Status reported by the upstream API.
        status: reqwest::StatusCode,
    },

    /// The response body stream broke mid-flight.
    #[error("response stream error: {0}")]
    Stream(String),

    /// A second assistant turn was started while one was still accumulating.
    #[error("an assistant turn is already in flight")]
    TurnInProgress,
}
