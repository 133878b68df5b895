//! Answer service abstraction and HTTP implementation.
//!
//! The widget never talks to the network directly. It hands the trimmed
//! question to an [`AnswerService`] and renders whatever comes back:
//!
//! - a decoded [`Answer`] on any 2xx JSON response
//! - an [`Error`](crate::Error) for non-2xx statuses, transport failures and
//!   bodies that are not JSON
//!
//! # Wire format
//!
//! ```text
//! POST /api/faq
//! Content-Type: application/json
//!
//! {"question": "How do I apply?"}
//! ```
//!
//! Success bodies carry `{"answer": "..."}` and optionally
//! `{"needs_confirmation": true}`.

mod http;

pub use http::{
    DEFAULT_FAQ_PATH, DEFAULT_HEALTH_PATH, HEALTH_CHECK_TIMEOUT, HealthStatus, HttpAnswerClient,
};

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Text shown when a successful response has no usable `answer`.
pub const NO_RESPONSE_TEXT: &str = "No response received";

/// Request body for the FAQ endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct FaqRequest<'a> {
    /// The user's question, already trimmed.
    pub question: &'a str,
}

/// Decoded success reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    /// Answer text, `None` when the key was missing, null, empty or not a string.
    pub text: Option<String>,
    /// Backend asks the user to confirm a follow-up search.
    pub needs_confirmation: bool,
}

impl Answer {
    /// Build an answer carrying the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            needs_confirmation: false,
        }
    }

    /// Decode a success body.
    ///
    /// Non-object bodies decode to an answer without text.
    #[must_use]
    pub fn from_json(body: &Value) -> Self {
        let text = body
            .get("answer")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let needs_confirmation = body
            .get("needs_confirmation")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Self {
            text,
            needs_confirmation,
        }
    }

    /// Text to render as the bot message.
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.text.as_deref().unwrap_or(NO_RESPONSE_TEXT)
    }
}

/// Something that can answer a user's question.
#[async_trait::async_trait]
pub trait AnswerService: Send + Sync {
    /// Ask a question and wait for the reply.
    async fn ask(&self, question: &str) -> Result<Answer>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_answer_text() {
        let answer = Answer::from_json(&json!({ "answer": "Hi there" }));
        assert_eq!(answer.display_text(), "Hi there");
        assert!(!answer.needs_confirmation);
    }

    #[test]
    fn test_missing_answer_key() {
        let answer = Answer::from_json(&json!({ "detail": "nothing here" }));
        assert_eq!(answer.text, None);
        assert_eq!(answer.display_text(), NO_RESPONSE_TEXT);
    }

    #[test]
    fn test_empty_or_non_string_answer() {
        assert_eq!(
            Answer::from_json(&json!({ "answer": "" })).display_text(),
            NO_RESPONSE_TEXT
        );
        assert_eq!(
            Answer::from_json(&json!({ "answer": null })).display_text(),
            NO_RESPONSE_TEXT
        );
        assert_eq!(
            Answer::from_json(&json!({ "answer": 42 })).display_text(),
            NO_RESPONSE_TEXT
        );
        assert_eq!(Answer::from_json(&json!(["a"])).display_text(), NO_RESPONSE_TEXT);
    }

    #[test]
    fn test_needs_confirmation_flag() {
        let answer = Answer::from_json(&json!({
            "answer": "Do you want me to search the web?",
            "needs_confirmation": true
        }));
        assert!(answer.needs_confirmation);
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(FaqRequest { question: "Hello" }).unwrap();
        assert_eq!(body, json!({ "question": "Hello" }));
    }
}
