//! Error types for cmkit-common.

use thiserror::Error;

/// Broad classification of a decode failure.
///
/// Every crate-specific error maps onto one of these so callers can decide
/// whether a failure is worth reporting without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The file is missing, empty, or could not be read.
    SourceUnavailable,
    /// Signature mismatch or an otherwise unusable header.
    MalformedHeader,
    /// A read ran past the end of the buffer.
    TruncatedData,
    /// The header parsed but declares a version known not to work.
    IncompatibleVersion,
    /// A field parsed but its contents are unusable.
    InvalidData,
}

/// Common error type for cmkit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// Container signature did not match.
    #[error("invalid signature: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: String, actual: String },

    /// A 7-bit encoded integer used more than five bytes.
    #[error("malformed 7-bit encoded integer")]
    Invalid7BitInt,

    /// A length prefix was negative.
    #[error("negative length: {0}")]
    NegativeLength(i32),

    /// The file does not exist or the handle is not valid.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// The file exists but has no contents.
    #[error("file is empty: {0}")]
    EmptyFile(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnexpectedEof { .. } => ErrorKind::TruncatedData,
            Error::InvalidMagic { .. } => ErrorKind::MalformedHeader,
            Error::Invalid7BitInt | Error::NegativeLength(_) => ErrorKind::InvalidData,
            Error::FileNotFound(_) | Error::EmptyFile(_) | Error::Io(_) => {
                ErrorKind::SourceUnavailable
            }
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
