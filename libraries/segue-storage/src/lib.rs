//! Segue Storage
//!
//! `PlaylistStore` implementations: JSON files on disk for the real player
//! and an in-memory store for tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use segue_core::{PlaylistStore, Track};
//! use segue_storage::JsonFileStore;
//!
//! let store = JsonFileStore::new(".segue")?;
//! store.save_playlist(&[Track::new("Song", "/music/song.flac")])?;
//! let playlist = store.load_playlist()?;
//! # Ok::<(), segue_core::SegueError>(())
//! ```

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
