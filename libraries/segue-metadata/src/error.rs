/// Metadata-specific errors
use thiserror::Error;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata error types
#[derive(Error, Debug)]
pub enum MetadataError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Extension is not in the supported list
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Lofty error
    #[error(transparent)]
    Lofty(#[from] lofty::error::LoftyError),
}

impl From<MetadataError> for segue_core::SegueError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::FileNotFound(path) => segue_core::SegueError::not_found("Track", path),
            other => segue_core::SegueError::metadata(other.to_string()),
        }
    }
}
