//! Error types for message delivery

use thiserror::Error;

/// Result type for delivery operations
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Errors that can occur while delivering a report
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The channel rejected the rich-markup payload
    #[error("Markup rejected by channel: {0}")]
    MarkupRejected(String),

    /// The channel refused the message for another reason
    #[error("Send failed (code {code:?}): {description}")]
    SendFailed {
        code: Option<i64>,
        description: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Malformed API response
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
