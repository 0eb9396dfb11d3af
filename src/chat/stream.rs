//! Incremental consumer for the chat-completions token stream.
//!
//! The response body is UTF-8 text framed as newline-delimited records, each
//! non-empty record prefixed with `data: ` and carrying either a JSON stream
//! chunk or the `[DONE]` sentinel. Tokens are handed to the sink in arrival
//! order; a malformed record is logged and skipped, never aborting the
//! stream.

use std::pin::pin;

use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::chat::error::ChatError;

/// Record prefix for stream data lines.
const DATA_PREFIX: &str = "data: ";

/// Sentinel marking the end of the upstream stream.
const DONE_SENTINEL: &str = "[DONE]";

/// How a token stream ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The transport reported end-of-stream.
    Complete,
    /// The caller cancelled; the remainder of the body was abandoned.
    Cancelled,
}

#[derive(Debug, Deserialize)]
struct StreamRecord {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

/// Consume a chunked response body and surface decoded tokens to `sink`.
///
/// Partial lines are buffered across chunks; the chunk read is the sole
/// suspension point and is raced against `cancel`. On cancellation the body
/// stream is dropped, which releases the underlying connection.
///
/// # Errors
/// Returns [`ChatError::Stream`] if the transport fails mid-body.
pub async fn read_token_stream<S, B, E, F>(
    stream: S,
    cancel: &CancellationToken,
    mut sink: F,
) -> Result<StreamOutcome, ChatError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
    F: FnMut(&str),
{
    let mut stream = pin!(stream);
    // Raw bytes, decoded only per complete line: a transport chunk may end
    // in the middle of a multi-byte UTF-8 codepoint.
    let mut buffer: Vec<u8> = Vec::new();

    loop {
        let chunk = tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!("token stream cancelled by caller");
                return Ok(StreamOutcome::Cancelled);
            }
            next = stream.next() => match next {
                Some(Ok(chunk)) => chunk,
                Some(Err(err)) => return Err(ChatError::Stream(err.to_string())),
                None => break,
            },
        };

        buffer.extend_from_slice(chunk.as_ref());

        while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=pos).collect();
            handle_line(&String::from_utf8_lossy(&line), &mut sink);
        }
    }

    // A final record may arrive without a trailing newline.
    if !buffer.is_empty() {
        let line = std::mem::take(&mut buffer);
        handle_line(&String::from_utf8_lossy(&line), &mut sink);
    }

    Ok(StreamOutcome::Complete)
}

fn handle_line(line: &str, sink: &mut impl FnMut(&str)) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    let Some(data) = line.strip_prefix(DATA_PREFIX) else {
        return;
    };
    if data.trim() == DONE_SENTINEL {
        return;
    }

    match serde_json::from_str::<StreamRecord>(data) {
        Ok(record) => {
            let token = record
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content);
            if let Some(token) = token
                && !token.is_empty()
            {
                sink(&token);
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "skipping malformed stream line");
        }
    }
}
