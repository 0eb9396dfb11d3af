//! Conversation transcript: an ordered sequence of messages with at most one
//! assistant message accumulating tokens at a time.

use serde::{Deserialize, Serialize};

use crate::chat::client::ChatMessage;
use crate::chat::error::ChatError;

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human side of the conversation.
    User,
    /// The model side of the conversation.
    Assistant,
}

impl Role {
    /// Wire name of the role for the chat-completions API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message of the transcript. Content is mutable while the message is the
/// in-flight assistant placeholder, immutable after the stream completes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Locally assigned monotonic id.
    pub id: u64,
    /// Author of the message.
    pub role: Role,
    /// Accumulated text.
    pub content: String,
}

/// Ordered conversation transcript (insertion order is display order).
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
    in_flight: Option<u64>,
}

impl Transcript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in display order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Id of the assistant message currently accumulating tokens, if any.
    #[must_use]
    pub const fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Append a user message and return its id.
    pub fn push_user(&mut self, content: impl Into<String>) -> u64 {
        let id = self.allocate_id();
        self.messages.push(Message {
            id,
            role: Role::User,
            content: content.into(),
        });
        id
    }

    /// Create the empty assistant placeholder that the stream will fill, and
    /// mark it in-flight.
    ///
    /// # Errors
    /// Returns [`ChatError::TurnInProgress`] if a placeholder is already
    /// accumulating tokens.
    pub fn begin_assistant(&mut self) -> Result<u64, ChatError> {
        if self.in_flight.is_some() {
            return Err(ChatError::TurnInProgress);
        }
        let id = self.allocate_id();
        self.messages.push(Message {
            id,
            role: Role::Assistant,
            content: String::new(),
        });
        self.in_flight = Some(id);
        Ok(id)
    }

    /// Append a token to the message with the given id. Tokens addressed to
    /// any other id are ignored.
    pub fn append(&mut self, id: u64, token: &str) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == id) {
            message.content.push_str(token);
        }
    }

    /// Mark the in-flight assistant message as complete.
    pub fn finish(&mut self, id: u64) {
        if self.in_flight == Some(id) {
            self.in_flight = None;
        }
    }

    /// "New chat": drop every message. Ids keep climbing; only ordering
    /// within one transcript matters.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.in_flight = None;
    }

    /// Shape the transcript for the outbound API call: system prompt first,
    /// then every message except the in-flight placeholder.
    #[must_use]
    pub fn as_api_messages(&self, system_prompt: &str) -> Vec<ChatMessage> {
        let mut out = Vec::with_capacity(self.messages.len() + 1);
        out.push(ChatMessage {
            role: "system".to_string(),
            content: system_prompt.to_string(),
        });
        for message in &self.messages {
            if self.in_flight == Some(message.id) {
                continue;
            }
            out.push(ChatMessage {
                role: message.role.as_str().to_string(),
                content: message.content.clone(),
            });
        }
        out
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_across_roles() {
        let mut transcript = Transcript::new();
        let a = transcript.push_user("hi");
        let b = transcript.begin_assistant().unwrap();
        transcript.finish(b);
        let c = transcript.push_user("again");
        assert!(a < b && b < c);
    }

    #[test]
    fn tokens_accumulate_on_the_placeholder_only() {
        let mut transcript = Transcript::new();
        transcript.push_user("hi");
        let id = transcript.begin_assistant().unwrap();

        transcript.append(id, "Hel");
        transcript.append(id, "lo");
        transcript.append(9999, "noise");

        let assistant = transcript.messages().last().unwrap();
        assert_eq!(assistant.content, "Hello");
    }

    #[test]
    fn second_in_flight_turn_is_rejected() {
        let mut transcript = Transcript::new();
        transcript.begin_assistant().unwrap();
        assert!(matches!(
            transcript.begin_assistant(),
            Err(ChatError::TurnInProgress)
        ));
    }

    #[test]
    fn finish_releases_the_in_flight_marker() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_assistant().unwrap();
        transcript.finish(id);
        assert!(transcript.in_flight().is_none());
        assert!(transcript.begin_assistant().is_ok());
    }

    #[test]
    fn api_messages_prepend_system_and_skip_placeholder() {
        let mut transcript = Transcript::new();
        transcript.push_user("question");
        transcript.begin_assistant().unwrap();

        let messages = transcript.as_api_messages("be helpful");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
    }

    #[test]
    fn clear_empties_the_sequence() {
        let mut transcript = Transcript::new();
        transcript.push_user("hi");
        transcript.clear();
        assert!(transcript.messages().is_empty());
        assert!(transcript.in_flight().is_none());
    }
}
