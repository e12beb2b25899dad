//! Error types for the remote inference layer.

use thiserror::Error;

/// Errors that can occur while calling a remote inference service.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Missing or malformed client settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// The request could not be delivered (connect failure, DNS, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete within the client timeout.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a non-success status or an error payload.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Parse(String),

    /// The service answered successfully but returned no text.
    #[error("service returned no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Timeout
        } else if err.is_decode() {
            InferenceError::Parse(err.to_string())
        } else {
            InferenceError::Network(err.to_string())
        }
    }
}
