//! In-memory store for tests and ephemeral sessions

use segue_core::{LastState, PlaylistStore, Result, SegueError, Track};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Saved {
    playlist: Vec<Track>,
    last_state: LastState,
    saves: usize,
    failing: bool,
}

/// `PlaylistStore` that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Saved>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a playlist and last state
    pub fn with_contents(playlist: Vec<Track>, last_state: LastState) -> Self {
        Self {
            saved: Mutex::new(Saved {
                playlist,
                last_state,
                ..Saved::default()
            }),
        }
    }

    /// Make every load and save fail with a storage error
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Number of successful save calls (playlist and state count separately)
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> MutexGuard<'_, Saved> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(saved: &Saved) -> Result<()> {
        if saved.failing {
            return Err(SegueError::storage("memory store unavailable"));
        }
        Ok(())
    }
}

impl PlaylistStore for MemoryStore {
    fn load_playlist(&self) -> Result<Vec<Track>> {
        let saved = self.lock();
        Self::check(&saved)?;
        Ok(saved.playlist.clone())
    }

    fn save_playlist(&self, tracks: &[Track]) -> Result<()> {
        let mut saved = self.lock();
        Self::check(&saved)?;
        saved.playlist = tracks.to_vec();
        saved.saves += 1;
        Ok(())
    }

    fn load_last_state(&self) -> Result<LastState> {
        let saved = self.lock();
        Self::check(&saved)?;
        Ok(saved.last_state)
    }

    fn save_last_state(&self, state: &LastState) -> Result<()> {
        let mut saved = self.lock();
        Self::check(&saved)?;
        saved.last_state = *state;
        saved.saves += 1;
        Ok(())
    }
}
