//! Error types for backend requests.

use thiserror::Error;

/// Errors that can occur when talking to a backend service.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The body was not the expected JSON.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The service could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The endpoint URL is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Connection(err.to_string())
        } else if err.is_builder() {
            SourceError::InvalidUrl(err.to_string())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Connection(err.to_string())
        }
    }
}
