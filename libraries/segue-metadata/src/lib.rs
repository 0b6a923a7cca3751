//! Segue Metadata
//!
//! `MetadataLookup` for local audio files: tags and duration are read with
//! lofty, the file stem stands in for a missing title.
//!
//! # Example
//!
//! ```rust,no_run
//! use segue_core::MetadataLookup;
//! use segue_metadata::LoftyTrackResolver;
//! use std::path::Path;
//!
//! let resolver = LoftyTrackResolver::new();
//! for path in resolver.collect_files(Path::new("/music/album"))? {
//!     let track = resolver.read_track(&path)?;
//!     println!("{} ({} ms)", track.title, track.duration_ms);
//! }
//! let stream = resolver.resolve("http://radio.example/stream.mp3");
//! # Ok::<(), segue_metadata::MetadataError>(())
//! ```

mod error;
mod resolver;

pub use error::{MetadataError, Result};
pub use resolver::{LoftyTrackResolver, DEFAULT_EXTENSIONS};
