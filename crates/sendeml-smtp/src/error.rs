//! Error types for SMTP operations.

use std::io;
use std::time::Duration;

use crate::types::ReplyCode;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error on an established connection.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The TCP connection could not be opened.
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        /// `host:port` that was dialed.
        addr: String,
        /// Underlying error.
        source: io::Error,
    },

    /// No reply arrived within the read timeout.
    #[error("Timed out after {0:?} waiting for server reply")]
    Timeout(Duration),

    /// The server closed the stream while a reply was expected.
    #[error("Connection closed by foreign host.")]
    ConnectionClosed,

    /// The server answered with a negative final reply.
    #[error("{reply}")]
    Rejected {
        /// Reply code (e.g., 550).
        code: ReplyCode,
        /// The final reply line as received.
        reply: String,
    },

    /// Invalid envelope address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// A transaction needs at least one recipient.
    #[error("No recipients specified")]
    NoRecipients,
}

impl Error {
    /// Creates a rejection error from a negative final reply line.
    #[must_use]
    pub fn rejected(code: ReplyCode, reply: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            reply: reply.into(),
        }
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::Rejected { code, .. } if code.is_permanent())
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Rejected { code, .. } if code.is_transient())
    }

    /// Returns true if the connection itself failed rather than a command.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Connect { .. } | Self::Timeout(_) | Self::ConnectionClosed
        )
    }
}
