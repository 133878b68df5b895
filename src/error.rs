//! Error types for the widget and its answer client.

use thiserror::Error;

use crate::widget::Element;

/// Crate error type.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a status was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Answer service returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        message: String,
    },

    /// Request did not complete within the allowed time.
    #[error("Timed out after {}ms", .0.as_millis())]
    Timeout(std::time::Duration),

    /// Required UI elements were not present when mounting.
    #[error("Missing required widget elements: {}", element_list(.0))]
    MissingElements(Vec<Element>),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

fn element_list(elements: &[Element]) -> String {
    elements
        .iter()
        .map(|e| format!("#{}", e.dom_id()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for widget operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_elements_message() {
        let err = Error::MissingElements(vec![Element::Panel, Element::MessageList]);
        assert_eq!(
            err.to_string(),
            "Missing required widget elements: #chatModal, #chatMessages"
        );
    }

    #[test]
    fn test_api_error_message() {
        let err = Error::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "API error (500): boom");
    }

    #[test]
    fn test_timeout_message() {
        let err = Error::Timeout(std::time::Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Timed out after 1500ms");
    }
}
