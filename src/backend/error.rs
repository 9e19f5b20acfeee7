//! Backend error types
//!
//! Errors raised while talking to the hosted backend.

use thiserror::Error;

use crate::config::ConfigError;
use crate::timeout::TimeoutError;

/// Errors that can occur when reading from the backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// Client could not be constructed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend could not be reached
    #[error("Backend unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected row shape
    #[error("Decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Timeout(#[from] TimeoutError),
}

impl BackendError {
    /// Classify a transport error the way callers care about it
    pub(crate) fn from_transport(err: reqwest::Error, label: &str, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            BackendError::Timeout(TimeoutError::new(label, timeout_ms))
        } else if err.is_connect() {
            BackendError::Unavailable
        } else {
            BackendError::Request(err)
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}

/// Result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;
