//! Error types for the transition controller

use std::io;
use thiserror::Error;

/// Reason a decoder could not open or prepare a source
///
/// The four reasons are reported separately so the caller can tell a bad
/// locator from a permission problem or a broken decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SourceError {
    /// Locator is malformed or names an unsupported source
    #[error("invalid source argument")]
    ArgumentInvalid,

    /// Source exists but may not be read
    #[error("permission denied for source")]
    PermissionDenied,

    /// Source could not be read
    #[error("I/O failure while opening source")]
    IoFailure,

    /// Decoder is in a state where the call makes no sense
    #[error("decoder in invalid state")]
    InvalidState,
}

impl SourceError {
    /// Map an I/O error to the reason a file-backed decoder would report
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => Self::ArgumentInvalid,
            _ => Self::IoFailure,
        }
    }
}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        Self::from_io(&err)
    }
}

/// Transition controller errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// Decoder refused the source
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Standby guard could not be acquired; arming abandoned for this cycle
    #[error("interrupted while arming standby decoder")]
    Interrupted,

    /// Operation needs a bound active decoder
    #[error("no active decoder")]
    NoActiveDecoder,
}

/// Result type for transition operations
pub type Result<T> = std::result::Result<T, TransitionError>;
