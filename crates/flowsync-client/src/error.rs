//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors from the publish API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL building failed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The API rejected a publish with a structured error body.
    #[error("{}", .0.message)]
    Publish(PublishError),

    /// The API accepted the publish but returned no instance id.
    #[error("publish succeeded but the response carried no instance id")]
    MissingInstanceId,
}

/// Structured error extracted from a failed publish response.
///
/// `message` is the most specific message the body offers; `detail` is the
/// body's structured error object when one exists.
#[derive(Debug, Clone)]
pub struct PublishError {
    /// Human-readable failure message.
    pub message: String,
    /// Structured error detail from the response body, if any.
    pub detail: Option<serde_json::Value>,
    /// HTTP status code, if the request got that far.
    pub status: Option<u16>,
}

impl ClientError {
    /// The message that should surface in batch failure reports.
    pub fn report_message(&self) -> String {
        match self {
            ClientError::Publish(e) => e.message.clone(),
            other => other.to_string(),
        }
    }
}
