//! In-memory conversation transcript.
//!
//! A [`Transcript`] is an ordered sequence of [`Message`]s, append-only
//! except for the single assistant message currently receiving stream
//! output (the "open" message). The transcript is owned by a
//! [`ChatSession`](crate::ChatSession); consumers read cloned snapshots
//! and never mutate history directly.

use serde::{Deserialize, Serialize};

use crate::protocol::Citation;

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking.
    User,
    /// The backend's answer.
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of this entry.
    pub role: Role,
    /// Message text. For an open assistant message this grows as deltas
    /// arrive; it is frozen once the stream reaches a terminal state.
    pub content: String,
    /// Sources backing an assistant answer; always empty for user messages.
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            citations: Vec::new(),
        }
    }

    /// Create an empty assistant message ready to receive deltas.
    pub fn assistant() -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            citations: Vec::new(),
        }
    }

    /// Check whether this is an assistant message.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Ordered sequence of messages for one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check whether the transcript has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Begin a turn: append the user message and an empty assistant
    /// message that becomes the open message.
    pub(crate) fn begin_turn(&mut self, query: &str) {
        self.messages.push(Message::user(query));
        self.messages.push(Message::assistant());
    }

    /// The open assistant message, when the last entry is one.
    pub(crate) fn open(&self) -> Option<&Message> {
        self.messages.last().filter(|m| m.is_assistant())
    }

    /// Append a text delta to the open assistant message.
    ///
    /// Deltas are concatenated verbatim in arrival order; a delta with no
    /// open message to apply to is dropped.
    pub(crate) fn apply_delta(&mut self, text: &str) {
        if let Some(last) = self.messages.last_mut() {
            if last.is_assistant() {
                last.content.push_str(text);
            }
        }
    }

    /// Replace the open assistant message's citations wholesale.
    pub(crate) fn replace_citations(&mut self, citations: Vec<Citation>) {
        if let Some(last) = self.messages.last_mut() {
            if last.is_assistant() {
                last.citations = citations;
            }
        }
    }
}
