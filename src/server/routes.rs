//! HTTP route handlers for the newsbrief API.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::chat::{APOLOGY_TOKEN, ChatMessage};
use crate::feeds::FeedDigest;

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/rss", get(rss_feeds))
        .route("/api/chat", post(chat_stream))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "newsbrief-agent",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Successful aggregate feed response.
#[derive(Debug, Serialize)]
pub struct RssResponse {
    /// Digest per reachable source, in configured order.
    pub feeds: Vec<FeedDigest>,
    /// ISO-8601 timestamp of the aggregate.
    pub timestamp: String,
    /// Always `"success"`.
    pub status: &'static str,
}

/// Error body returned with HTTP 500.
#[derive(Debug, Serialize)]
pub struct RssErrorResponse {
    /// Always `true`.
    pub error: bool,
    /// Human-readable failure description.
    pub message: String,
    /// Always `"error"`.
    pub status: &'static str,
}

/// Handle aggregate feed requests.
async fn rss_feeds(State(state): State<Arc<AppState>>) -> Response {
    let feeds = state.feeds.fetch_all().await;

    if feeds.is_empty() {
        let body = RssErrorResponse {
            error: true,
            message: "failed to fetch any RSS source".to_string(),
            status: "error",
        };
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
    }

    let body = RssResponse {
        feeds,
        timestamp: Utc::now().to_rfc3339(),
        status: "success",
    };
    Json(body).into_response()
}

/// Chat proxy request: the prior transcript plus the new user message.
#[derive(Debug, Deserialize)]
pub struct ChatStreamRequest {
    /// Role/content pairs in conversation order.
    pub messages: Vec<ChatMessage>,
}

/// Handle chat requests by proxying the upstream token stream to the client
/// as server-sent events, one `data:` event per token.
///
/// Upstream failure is degraded to a single apology event, never an HTTP
/// error visible to the end user.
async fn chat_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatStreamRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded::<String>();

    tokio::spawn(async move {
        let cancel = CancellationToken::new();

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: state.config.llm.system_prompt.clone(),
        });
        messages.extend(request.messages);

        let sink_tx = tx.clone();
        let sink_cancel = cancel.clone();
        let result = state
            .chat
            .stream_chat(&messages, &cancel, |token| {
                // A failed send means the SSE client disconnected; cancel so
                // the chunk-read race stops consuming the upstream body.
                if sink_tx.unbounded_send(token.to_string()).is_err() {
                    sink_cancel.cancel();
                }
            })
            .await;

        if let Err(err) = result {
            tracing::warn!(error = %err, "chat proxy failed, substituting apology");
            let _ = tx.unbounded_send(APOLOGY_TOKEN.to_string());
        }
        // Dropping tx ends the SSE stream.
    });

    // `Event::data` rejects carriage returns; newlines are handled by the
    // event encoder itself.
    Sse::new(rx.map(|token| Ok(Event::default().data(token.replace('\r', "")))))
}
