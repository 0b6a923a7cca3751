/// Persisted and published playback state
use super::{PlaybackMode, Track};
use serde::{Deserialize, Serialize};

/// Last playback position, persisted across restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LastState {
    /// Playlist index that was current (`None` when nothing was playing)
    #[serde(default)]
    pub index: Option<usize>,

    /// Offset into that track in milliseconds
    #[serde(default)]
    pub position_ms: u64,

    /// Random/repeat flags
    #[serde(default)]
    pub mode: PlaybackMode,
}

/// State snapshot pushed to the presentation sink
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NowPlaying {
    /// Track currently playing or paused
    pub track: Option<Track>,

    /// Whether audio is audible right now
    pub is_playing: bool,

    /// Random/repeat flags
    pub mode: PlaybackMode,

    /// Number of tracks in the playlist
    pub playlist_length: usize,
}
