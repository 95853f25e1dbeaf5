//! Error types for menu decoding.

use cmkit_common::ErrorKind;
use thiserror::Error;

/// Errors that can occur when decoding menu containers or the descriptor cache.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] cmkit_common::Error),

    /// I/O error while writing the cache file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A `priority` command whose argument is not a number.
    #[error("invalid priority value: {0:?}")]
    InvalidPriority(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Common(e) => e.kind(),
            Error::Io(_) => ErrorKind::SourceUnavailable,
            Error::InvalidPriority(_) => ErrorKind::InvalidData,
        }
    }
}

/// Result type for menu operations.
pub type Result<T> = std::result::Result<T, Error>;
