//! Segue Core
//!
//! Platform-agnostic types, collaborator traits, and error handling shared by
//! every Segue crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `PlaybackMode`, `LastState`, `NowPlaying`
//! - **Collaborator Traits**: `MetadataLookup`, `PlaylistStore`, `PresentationSink`
//! - **Error Handling**: Unified `SegueError` and `Result` types
//!
//! The playback engine only talks to the outside world through these traits, so
//! persistence, tag reading and presentation can be swapped per platform.
//!
//! # Example
//!
//! ```rust
//! use segue_core::{PlaybackMode, RepeatMode, Track};
//!
//! let track = Track::new("Song", "/music/song.flac").with_duration_ms(180_000);
//! assert_eq!(track.duration_ms, 180_000);
//!
//! let mode = PlaybackMode::default().with_repeat(RepeatMode::All);
//! assert!(!mode.random);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SegueError};
pub use traits::{MetadataLookup, PlaylistStore, PresentationSink};
pub use types::{LastState, NowPlaying, PlaybackMode, RepeatMode, Track};
