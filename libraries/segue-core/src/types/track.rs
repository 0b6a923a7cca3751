/// Track domain type
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Audio track
///
/// Immutable once built by the metadata lookup; the engine only ever clones it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Track title
    pub title: String,

    /// Artist name
    #[serde(default)]
    pub artist: String,

    /// Album name
    #[serde(default)]
    pub album: String,

    /// Source locator handed to the decoder (file path or URL)
    pub locator: String,

    /// Track number within the album (0 when unknown)
    #[serde(default)]
    pub track_number: u32,

    /// Track duration in milliseconds (0 when unknown)
    #[serde(default)]
    pub duration_ms: u64,

    /// Key grouping tracks of the same album
    #[serde(default)]
    pub album_key: String,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(title: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: String::new(),
            album: String::new(),
            locator: locator.into(),
            track_number: 0,
            duration_ms: 0,
            album_key: String::new(),
        }
    }

    /// Set the artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    /// Set the album and derive its grouping key
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self.album_key = Self::album_key_for(&self.album, &self.artist);
        self
    }

    /// Set the track number
    #[must_use]
    pub fn with_track_number(mut self, track_number: u32) -> Self {
        self.track_number = track_number;
        self
    }

    /// Set the duration in milliseconds
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Get the track duration, `None` when unknown
    pub fn duration(&self) -> Option<Duration> {
        (self.duration_ms > 0).then(|| Duration::from_millis(self.duration_ms))
    }

    /// Grouping key for an album: case-folded album title plus artist
    pub fn album_key_for(album: &str, artist: &str) -> String {
        if album.is_empty() {
            return String::new();
        }
        format!(
            "{}\u{1f}{}",
            album.trim().to_lowercase(),
            artist.trim().to_lowercase()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let track = Track::new("Song", "/music/song.mp3")
            .with_artist("Artist")
            .with_album("Album")
            .with_track_number(3)
            .with_duration_ms(180_000);

        assert_eq!(track.title, "Song");
        assert_eq!(track.locator, "/music/song.mp3");
        assert_eq!(track.track_number, 3);
        assert_eq!(track.duration(), Some(Duration::from_secs(180)));
        assert!(!track.album_key.is_empty());
    }

    #[test]
    fn unknown_duration_is_none() {
        let track = Track::new("Song", "/music/song.mp3");
        assert_eq!(track.duration(), None);
    }

    #[test]
    fn album_key_ignores_case_and_padding() {
        assert_eq!(
            Track::album_key_for("Blue Train ", "John Coltrane"),
            Track::album_key_for("blue train", " JOHN COLTRANE")
        );
        assert_eq!(Track::album_key_for("", "Anyone"), "");
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        let json = r#"{"title":"Song","locator":"/music/song.mp3"}"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track, Track::new("Song", "/music/song.mp3"));
    }
}
