//! Error types for playback orchestration

use segue_core::SegueError;
use segue_transition::{SourceError, TransitionError};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Decoder could not open the track's source
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Locator is not known to the metadata lookup
    #[error("Not found: {0}")]
    NotFound(String),

    /// Command makes no sense in the current state (seek past end, nothing playing, ...)
    #[error("Illegal command: {0}")]
    IllegalCommand(String),

    /// Standby arming was interrupted
    #[error("Interrupted while arming the next track")]
    Interrupted,

    /// Index out of bounds
    #[error("Index out of bounds: {index} (playlist length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Engine worker is no longer running
    #[error("Playback engine stopped")]
    EngineStopped,

    /// Collaborator failure (storage, metadata)
    #[error(transparent)]
    Core(#[from] SegueError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaybackError {
    /// Errors that only mean "ignored": logged at debug, never surfaced
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::IllegalCommand(_) | Self::IndexOutOfBounds { .. })
    }
}

impl From<TransitionError> for PlaybackError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Source(source) => Self::Source(source),
            TransitionError::Interrupted => Self::Interrupted,
            TransitionError::NoActiveDecoder => Self::IllegalCommand("no active decoder".into()),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
