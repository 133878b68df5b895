//! Chat messages.
//!
//! A [`Message`] is created when the user submits text or when an answer
//! settles. Messages are rendered once and never mutated; the transcript only
//! grows for the lifetime of the widget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing into the widget.
    User,
    /// The answer service.
    Bot,
}

impl Sender {
    /// Stable lowercase name (`"user"` / `"bot"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }

}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message.
    pub sender: Sender,
    /// Text content, rendered verbatim.
    pub content: String,
    /// When the message was appended.
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            sender,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    /// Create a bot message.
    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(Sender::Bot, content)
    }
}
