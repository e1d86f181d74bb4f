//! Error model used by Toggl API client operations.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TogglError>;

/// Represents the failures a Toggl call can end in, from HTTP and auth failures to malformed payloads.
#[derive(Debug, Error)]
pub enum TogglError {
    #[error("http {status}: {message}")]
    Http { status: StatusCode, message: String },
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("invalid time entry: {0}")]
    InvalidEntry(String),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl TogglError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        TogglError::Http {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TogglError {
    /// Converts reqwest errors into semantic TogglError variants.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TogglError::Timeout(err.to_string())
        } else if err.is_status() {
            let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            TogglError::http(status, err.to_string())
        } else if err.is_connect() {
            TogglError::Network(err.to_string())
        } else {
            TogglError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TogglError {
    fn from(err: serde_json::Error) -> Self {
        TogglError::Serialization(err.to_string())
    }
}
