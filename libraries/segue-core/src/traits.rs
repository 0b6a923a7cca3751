/// Collaborator traits for Segue
///
/// The playback engine owns playlist truth; everything it needs from the
/// platform (tag lookup, storage, presentation) comes through these traits.
use crate::error::Result;
use crate::types::{LastState, NowPlaying, Track};

/// Metadata lookup
///
/// Turns a source locator into a fully described `Track`.
pub trait MetadataLookup: Send + Sync {
    /// Resolve a locator against the media index
    ///
    /// # Errors
    /// Returns `SegueError::NotFound` if the locator is not indexed
    fn resolve(&self, locator: &str) -> Result<Track>;
}

/// Playlist and playback-state persistence
pub trait PlaylistStore: Send + Sync {
    /// Load the saved playlist (empty when nothing was saved)
    fn load_playlist(&self) -> Result<Vec<Track>>;

    /// Replace the saved playlist
    fn save_playlist(&self, tracks: &[Track]) -> Result<()>;

    /// Load the last playback state (default when nothing was saved)
    fn load_last_state(&self) -> Result<LastState>;

    /// Replace the last playback state
    fn save_last_state(&self, state: &LastState) -> Result<()>;
}

/// Presentation sink
///
/// Push-only and best effort: implementations must not block, and a dropped
/// snapshot is never retried.
pub trait PresentationSink: Send + Sync {
    /// Receive the latest state snapshot
    fn publish(&self, now_playing: &NowPlaying);

    /// Show a user-visible failure notice (track could not be started, ...)
    fn report_failure(&self, message: &str) {
        let _ = message;
    }
}

impl<T: MetadataLookup + ?Sized> MetadataLookup for std::sync::Arc<T> {
    fn resolve(&self, locator: &str) -> Result<Track> {
        (**self).resolve(locator)
    }
}

impl<T: PlaylistStore + ?Sized> PlaylistStore for std::sync::Arc<T> {
    fn load_playlist(&self) -> Result<Vec<Track>> {
        (**self).load_playlist()
    }

    fn save_playlist(&self, tracks: &[Track]) -> Result<()> {
        (**self).save_playlist(tracks)
    }

    fn load_last_state(&self) -> Result<LastState> {
        (**self).load_last_state()
    }

    fn save_last_state(&self, state: &LastState) -> Result<()> {
        (**self).save_last_state(state)
    }
}

impl<T: PresentationSink + ?Sized> PresentationSink for std::sync::Arc<T> {
    fn publish(&self, now_playing: &NowPlaying) {
        (**self).publish(now_playing);
    }

    fn report_failure(&self, message: &str) {
        (**self).report_failure(message);
    }
}
