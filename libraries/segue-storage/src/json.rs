//! JSON file store
//!
//! Two files in one directory:
//! - `playlist.json` - array of tracks
//! - `state.json` - `{index, position_ms, mode}`
//!
//! Missing files load as an empty playlist / default state. Writes go to a
//! temporary sibling first and are renamed into place.

use segue_core::{LastState, PlaylistStore, Result, SegueError, Track};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PLAYLIST_FILE: &str = "playlist.json";
const STATE_FILE: &str = "state.json";

/// `PlaylistStore` backed by JSON files
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a store directory
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            info!(dir = %dir.display(), "created state directory");
        }
        if !dir.is_dir() {
            return Err(SegueError::storage(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn playlist_path(&self) -> PathBuf {
        self.dir.join(PLAYLIST_FILE)
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            debug!(path = %path.display(), "state file does not exist");
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn write<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "saved state file");
        Ok(())
    }
}

impl PlaylistStore for JsonFileStore {
    fn load_playlist(&self) -> Result<Vec<Track>> {
        Ok(Self::read(&self.playlist_path())?.unwrap_or_default())
    }

    fn save_playlist(&self, tracks: &[Track]) -> Result<()> {
        Self::write(&self.playlist_path(), tracks)
    }

    fn load_last_state(&self) -> Result<LastState> {
        Ok(Self::read(&self.state_path())?.unwrap_or_default())
    }

    fn save_last_state(&self, state: &LastState) -> Result<()> {
        Self::write(&self.state_path(), state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segue_core::{PlaybackMode, RepeatMode};
    use tempfile::tempdir;

    #[test]
    fn missing_files_load_as_defaults() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonFileStore::new(dir.path())?;

        assert!(store.load_playlist()?.is_empty());
        assert_eq!(store.load_last_state()?, LastState::default());
        Ok(())
    }

    #[test]
    fn creates_missing_directory() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("a").join("b");
        let store = JsonFileStore::new(&nested)?;
        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());
        Ok(())
    }

    #[test]
    fn state_file_uses_flat_layout() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonFileStore::new(dir.path())?;
        store.save_last_state(&LastState {
            index: Some(2),
            position_ms: 1500,
            mode: PlaybackMode::new(true, RepeatMode::All),
        })?;

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.state_path())?)?;
        assert_eq!(raw["index"], 2);
        assert_eq!(raw["position_ms"], 1500);
        assert_eq!(raw["mode"]["random"], true);
        assert_eq!(raw["mode"]["repeat"], "all");
        assert!(!store.dir().join("state.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonFileStore::new(dir.path())?;
        fs::write(store.playlist_path(), "not json")?;

        assert!(matches!(
            store.load_playlist(),
            Err(SegueError::Serialization(_))
        ));
        Ok(())
    }

    #[test]
    fn file_in_place_of_directory_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("file");
        fs::write(&file, "x")?;
        assert!(matches!(
            JsonFileStore::new(&file),
            Err(SegueError::Storage(_))
        ));
        Ok(())
    }
}
