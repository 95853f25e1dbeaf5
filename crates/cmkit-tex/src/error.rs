//! Error types for texture decoding.

use cmkit_common::ErrorKind;
use thiserror::Error;

/// Errors that can occur when decoding texture containers.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] cmkit_common::Error),

    /// A legacy payload too short to hold its image dimensions.
    #[error("legacy texture payload has {0} bytes, too short to hold its dimensions")]
    LegacyPayloadTooShort(usize),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Common(e) => e.kind(),
            Error::LegacyPayloadTooShort(_) => ErrorKind::TruncatedData,
        }
    }
}

/// Result type for texture operations.
pub type Result<T> = std::result::Result<T, Error>;
