/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] segue_core::SegueError),

    #[error(transparent)]
    Playback(#[from] segue_playback::PlaybackError),

    #[error(transparent)]
    Metadata(#[from] segue_metadata::MetadataError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
