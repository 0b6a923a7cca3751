/// Track lookup using the lofty library
use crate::error::{MetadataError, Result};
use lofty::{AudioFile, TaggedFileExt};
use segue_core::{MetadataLookup, Track};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Extensions resolved by default
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "wav", "m4a", "aac"];

/// Tag fields read from one file
#[derive(Debug, Default)]
struct Tags {
    title: Option<String>,
    artist: Option<String>,
    album: Option<String>,
    track_number: Option<u32>,
}

/// `MetadataLookup` reading tags and duration from local files
///
/// Locators with a URL scheme are not read; they resolve to a bare track
/// titled after the locator.
#[derive(Debug, Clone)]
pub struct LoftyTrackResolver {
    extensions: Vec<String>,
}

impl LoftyTrackResolver {
    pub fn new() -> Self {
        Self::with_extensions(DEFAULT_EXTENSIONS.iter().copied())
    }

    /// Resolver accepting only the given (case-insensitive) extensions
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Whether `path` has one of the accepted extensions
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(&e.to_lowercase()))
    }

    /// Read a track from a local file
    pub fn read_track(&self, path: &Path) -> Result<Track> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.display().to_string()));
        }
        if !self.is_supported(path) {
            return Err(MetadataError::UnsupportedFormat(path.display().to_string()));
        }

        let tagged_file = lofty::read_from_path(path)?;
        let duration_ms = tagged_file.properties().duration().as_millis() as u64;

        let tags = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.tags().first())
            .map(Self::extract_from_tag)
            .unwrap_or_default();

        let title = tags.title.unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        });

        let mut track = Track::new(title, path.to_string_lossy())
            .with_artist(tags.artist.unwrap_or_default())
            .with_duration_ms(duration_ms);
        if let Some(album) = tags.album {
            track = track.with_album(album);
        }
        if let Some(number) = tags.track_number {
            track = track.with_track_number(number);
        }

        trace!(path = %path.display(), title = %track.title, duration_ms, "read track tags");
        Ok(track)
    }

    /// Supported files under `root` (or `root` itself), sorted by path
    pub fn collect_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.exists() {
            return Err(MetadataError::FileNotFound(root.display().to_string()));
        }
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).follow_links(true) {
            let entry = entry.map_err(|e| MetadataError::Io(e.into()))?;
            if entry.file_type().is_file() && self.is_supported(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        debug!(root = %root.display(), count = files.len(), "collected audio files");
        Ok(files)
    }

    fn extract_from_tag(tag: &lofty::Tag) -> Tags {
        let mut tags = Tags::default();

        for item in tag.items() {
            let Some(text) = item.value().text() else {
                continue;
            };
            match item.key() {
                lofty::ItemKey::TrackTitle => tags.title = Some(text.to_string()),
                lofty::ItemKey::TrackArtist => tags.artist = Some(text.to_string()),
                lofty::ItemKey::AlbumArtist if tags.artist.is_none() => {
                    tags.artist = Some(text.to_string());
                }
                lofty::ItemKey::AlbumTitle => tags.album = Some(text.to_string()),
                lofty::ItemKey::TrackNumber => tags.track_number = parse_track_number(text),
                _ => {}
            }
        }

        tags
    }
}

impl Default for LoftyTrackResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataLookup for LoftyTrackResolver {
    fn resolve(&self, locator: &str) -> segue_core::Result<Track> {
        if is_url(locator) {
            return Ok(Track::new(locator, locator));
        }
        Ok(self.read_track(Path::new(locator))?)
    }
}

/// "3" and "3/12" both parse as 3
fn parse_track_number(text: &str) -> Option<u32> {
    text.split('/').next()?.trim().parse().ok()
}

fn is_url(locator: &str) -> bool {
    locator.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+')
    })
}
