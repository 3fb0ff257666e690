//! Error types for opening and reading connections.
//!
//! # Design
//! `Io`, `Transport` and `Status` together form the transport failure family:
//! anything that went wrong while talking to the resource, including a
//! server answering with a status that is neither success nor a followed
//! redirect, or a `Location` that cannot be followed. `MalformedUrl` is
//! raised while resolving the input, before any I/O happens, so callers can
//! tell a bad address from a bad server.

use thiserror::Error;

/// Errors returned while resolving, opening or reading a connection.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Local I/O failure, e.g. reading a body or a file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The transport could not complete the exchange (connect, DNS,
    /// protocol errors).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status that is neither success nor a
    /// followed redirect. Displays as the server's status message.
    #[error("{message}")]
    Status { code: u16, message: String },

    /// The input could not be turned into a URL.
    #[error("malformed url `{input}`: {reason}")]
    MalformedUrl { input: String, reason: String },

    /// Connection parameters could not be decoded from JSON.
    #[error("invalid connection parameters: {0}")]
    Json(#[from] serde_json::Error),

    /// No transport is available for the URL scheme.
    #[error("unsupported url scheme `{0}`")]
    UnsupportedScheme(String),
}

impl FetchError {
    /// True for failures that happened while talking to the resource, as
    /// opposed to resolving its address.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Io(_) | FetchError::Transport(_) | FetchError::Status { .. }
        )
    }

    /// HTTP status code carried by a `Status` error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn malformed(input: &str, reason: impl ToString) -> Self {
        FetchError::MalformedUrl {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}
