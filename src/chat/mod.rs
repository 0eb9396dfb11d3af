//! Streaming chat pipeline.
//!
//! A turn pushes the user message, creates the single in-flight assistant
//! placeholder, and streams decoded tokens into it. Upstream failures are
//! degraded to a fixed apology message in the transcript rather than
//! surfaced as errors.

pub mod client;
pub mod error;
pub mod stream;
pub mod transcript;

pub use client::{ChatClient, ChatMessage};
pub use error::ChatError;
pub use stream::{StreamOutcome, read_token_stream};
pub use transcript::{Message, Role, Transcript};

use tokio_util::sync::CancellationToken;

/// User-facing text substituted into the transcript when the chat request or
/// stream fails.
pub const APOLOGY_TOKEN: &str = "Sorry, I ran into a problem. Please try again later.";

/// Run one conversation turn: send `user_text` with the prior transcript and
/// accumulate the streamed reply into a new assistant message.
///
/// Any request or stream failure is swallowed here: the assistant message is
/// filled with [`APOLOGY_TOKEN`] and the turn still completes.
///
/// # Errors
/// Returns [`ChatError::TurnInProgress`] if an assistant message is already
/// accumulating tokens.
pub async fn run_turn(
    transcript: &mut Transcript,
    client: &ChatClient,
    user_text: &str,
    cancel: &CancellationToken,
) -> Result<u64, ChatError> {
    transcript.push_user(user_text);
    let assistant_id = transcript.begin_assistant()?;

    let messages = transcript.as_api_messages(&client.config().system_prompt);
    let result = client
        .stream_chat(&messages, cancel, |token| {
            transcript.append(assistant_id, token);
        })
        .await;

    if let Err(err) = result {
        tracing::warn!(error = %err, "chat turn failed, substituting apology");
        transcript.append(assistant_id, APOLOGY_TOKEN);
    }

    transcript.finish(assistant_id);
    Ok(assistant_id)
}
