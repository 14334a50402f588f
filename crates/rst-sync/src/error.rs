//! Error types for tab synchronization.
//!
//! [`FetchError`] is what the fetch capability reports when a request
//! settles unsuccessfully; it is recovered locally by the coordinator and
//! only ever reaches the user as a notification. [`SyncError`] reports
//! misuse of the coordinator or the project registry.

use thiserror::Error;

use crate::coordinator::TabPhase;
use crate::project::ResultId;

/// A request for a result set did not produce a usable payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The server could not be reached.
    #[error("server not responding: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The payload did not have the expected shape.
    #[error("unexpected {resource} payload: {reason}")]
    Decode { resource: String, reason: String },

    /// The request could not be built, so nothing was sent.
    #[error("request not sent: {0}")]
    Request(String),
}

impl FetchError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => "Server not responding".to_string(),
            Self::Status { status, message } if message.trim().is_empty() => {
                format!("The server rejected the request (status {status}).")
            }
            Self::Status { message, .. } => message.clone(),
            Self::Decode { resource, .. } => {
                format!("The server sent a {resource} result this version cannot read.")
            }
            Self::Request(reason) => reason.clone(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Transport(_) => Some("Check that the server is running and reachable.".into()),
            Self::Status { status, .. } if *status == 404 => {
                Some("The project may have been closed on the server. Reopen it.".into())
            }
            Self::Status { .. } => None,
            Self::Decode { .. } => {
                Some("Make sure client and server versions match.".into())
            }
            Self::Request(_) => Some("Check the server address in the client settings.".into()),
        }
    }
}

/// Misuse of the synchronization layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SyncError {
    /// A resource name that no tab kind fetches.
    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    /// A tab was mounted or switched while no project is open.
    #[error("no project is open")]
    NoProject,

    /// The registry has no project with this id.
    #[error("unknown project '{0}'")]
    UnknownProject(ResultId),

    /// An operation that the current lifecycle phase does not allow.
    #[error("cannot {action} while the tab is {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: TabPhase,
    },
}

/// Result type alias for synchronization operations.
pub type Result<T> = std::result::Result<T, SyncError>;
