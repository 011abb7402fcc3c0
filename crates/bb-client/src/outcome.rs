//! Result channel for remote operations.
//!
//! Every remote call resolves to [`Outcome`]: a value, or the displayable
//! messages the server reported. Failures travel as data, never as panics,
//! so callers stay linear and testable.

use thiserror::Error;

/// Failed remote operation, carrying one or more human-readable messages.
///
/// Messages come from the server's error payload where available (e.g. a
/// version-conflict rejection on merge) and from the transport layer
/// otherwise. `Display` joins them with newlines; callers that need a
/// different separator can use [`RemoteFailure::messages`] directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join("\n"))]
pub struct RemoteFailure {
    pub messages: Vec<String>,
}

impl RemoteFailure {
    /// Failure with a single message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    /// Failure from a batch of server messages; falls back to a generic
    /// message so a failure is never silent.
    pub fn from_messages(messages: Vec<String>) -> Self {
        if messages.is_empty() {
            Self::new("The server reported an error without details.")
        } else {
            Self { messages }
        }
    }
}

/// Result of a remote operation.
pub type Outcome<T> = Result<T, RemoteFailure>;
