//! Error types for the core library.

use std::path::PathBuf;

use thiserror::Error;

use crate::settings::ConfigError;

/// Errors that can occur while running a batch.
#[derive(Debug, Error)]
pub enum Error {
    /// The settings could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The SMTP session failed; the connection is abandoned.
    #[error(transparent)]
    Smtp(#[from] sendeml_smtp::Error),

    /// A message file could not be read.
    #[error("{}: {source}", path.display())]
    ReadMessage {
        /// Message file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A message could not be rewritten.
    #[error("{}: {source}", path.display())]
    InvalidMessage {
        /// Message file.
        path: PathBuf,
        /// Underlying error.
        source: sendeml_mime::Error,
    },
}

impl Error {
    /// Returns true if the error only concerns one message file, so the
    /// session can move on to the next one.
    #[must_use]
    pub const fn is_per_file(&self) -> bool {
        matches!(self, Self::ReadMessage { .. } | Self::InvalidMessage { .. })
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
