//! Core types for playback orchestration

use segue_core::{PlaybackMode, Track};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerState {
    /// No current track
    #[default]
    Empty,

    /// A track is bound and preparing
    Preparing,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Explicitly stopped (or a track failed to start)
    Stopped,
}

impl PlayerState {
    /// Whether a track is playing, paused or about to play
    pub fn is_active(self) -> bool {
        matches!(self, Self::Preparing | Self::Playing | Self::Paused)
    }
}

/// Copy of the orchestrator state for readers on other threads
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineSnapshot {
    pub state: PlayerState,
    pub current_index: Option<usize>,
    pub next_index: Option<usize>,
    pub last_index: Option<usize>,
    pub mode: PlaybackMode,

    /// Shared with the worker until its next playlist edit
    pub playlist: Arc<Vec<Track>>,

    /// Per-channel volume
    pub volume: (f32, f32),
}

impl EngineSnapshot {
    /// Track at `current_index`
    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.playlist.get(i))
    }

    /// Track at `next_index`
    pub fn next_track(&self) -> Option<&Track> {
        self.next_index.and_then(|i| self.playlist.get(i))
    }

    pub fn playlist_len(&self) -> usize {
        self.playlist.len()
    }
}
