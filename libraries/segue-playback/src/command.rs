//! Commands processed by the playback worker

use segue_core::{RepeatMode, Track};

/// One playback command
///
/// Every mutation of the playlist, indices or mode is expressed as a command
/// and processed strictly in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start playback, or resume when paused
    Play,

    /// Pause playback
    Pause,

    /// Resume paused playback
    Resume,

    /// Pause when playing, play otherwise
    TogglePause,

    /// Stop playback and remember the resume point
    Stop,

    /// Skip to the next track
    Next,

    /// Go to the previous track
    Previous,

    /// Seek within the current track (milliseconds)
    Seek(u64),

    /// Play the track at a playlist index
    JumpTo(usize),

    /// Append tracks to the playlist
    Enqueue(Vec<Track>),

    /// Insert a track right after the current one
    EnqueueNext(Track),

    /// Resolve locators through the metadata lookup and append them
    EnqueueLocators(Vec<String>),

    /// Remove the track at an index
    Dequeue(usize),

    /// Stop and empty the playlist
    Clear,

    /// Shuffle the playlist, moving the current track to the front
    Shuffle,

    /// Enable or disable random next-track selection
    SetRandom(bool),

    /// Set the repeat policy
    SetRepeat(RepeatMode),

    /// Per-channel volume (0.0 - 1.0)
    SetVolume(f32, f32),

    /// Persist playlist and last state now
    Save,

    /// Replace the playlist and start at `start_index`
    PlayAll { tracks: Vec<Track>, start_index: usize },
}

impl Command {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::TogglePause => "toggle_pause",
            Self::Stop => "stop",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Seek(_) => "seek",
            Self::JumpTo(_) => "jump_to",
            Self::Enqueue(_) => "enqueue",
            Self::EnqueueNext(_) => "enqueue_next",
            Self::EnqueueLocators(_) => "enqueue_locators",
            Self::Dequeue(_) => "dequeue",
            Self::Clear => "clear",
            Self::Shuffle => "shuffle",
            Self::SetRandom(_) => "set_random",
            Self::SetRepeat(_) => "set_repeat",
            Self::SetVolume(..) => "set_volume",
            Self::Save => "save",
            Self::PlayAll { .. } => "play_all",
        }
    }
}
