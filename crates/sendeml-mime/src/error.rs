//! Error types for message rewriting.

/// Result type alias for message operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The message has no blank line between header and body.
    #[error("Invalid mail: no blank line between header and body")]
    InvalidMessage,

    /// A header field name to match against was empty.
    #[error("Header field name must not be empty")]
    EmptyFieldName,
}
