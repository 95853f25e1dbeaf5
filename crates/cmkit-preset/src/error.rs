//! Error types for preset decoding.

use cmkit_common::ErrorKind;
use thiserror::Error;

/// Errors that can occur when decoding preset containers.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] cmkit_common::Error),

    /// The preset was saved by a game build this format cannot load.
    #[error("preset version {0} is not supported")]
    IncompatibleVersion(i32),

    /// The property-list decoder rejected the payload.
    #[error("invalid property list: {0}")]
    PropertyList(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Common(e) => e.kind(),
            Error::IncompatibleVersion(_) => ErrorKind::IncompatibleVersion,
            Error::PropertyList(_) => ErrorKind::InvalidData,
        }
    }
}

/// Result type for preset operations.
pub type Result<T> = std::result::Result<T, Error>;
