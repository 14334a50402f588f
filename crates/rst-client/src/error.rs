//! Client error types.

use std::path::PathBuf;

use rst_sync::FetchError;
use thiserror::Error;

/// Errors raised by the HTTP client and its settings file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Settings could not be written.
    #[error("Failed to {operation} settings file: {path}")]
    Settings {
        operation: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// The HTTP layer failed (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured server base is not a usable URL.
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ClientError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Settings { path, .. } => {
                format!("Could not save client settings to {}", path.display())
            }
            Self::Http(_) => "Server not responding".to_string(),
            Self::InvalidUrl { url, .. } => format!("'{url}' is not a valid server address"),
        }
    }
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(source) => match source.status() {
                Some(status) => FetchError::Status {
                    status: status.as_u16(),
                    message: source.to_string(),
                },
                None => FetchError::Transport(source.to_string()),
            },
            other => FetchError::Request(other.user_message()),
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
