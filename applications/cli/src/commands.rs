/// Subcommand implementations, kept out of `main` so they can be tested
use crate::{config::CliConfig, error::Result, sink::LogSink};
use segue_core::{LastState, MetadataLookup, PlaylistStore, RepeatMode, Track};
use segue_metadata::LoftyTrackResolver;
use segue_playback::{Collaborators, PlaybackEngine, PlayerState};
use segue_storage::JsonFileStore;
use segue_transition::ClockDecoder;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Resolve files, directories and URLs into tracks
///
/// Directories are walked for supported files. Inputs that cannot be resolved
/// are logged and skipped.
pub fn resolve_inputs(resolver: &LoftyTrackResolver, inputs: &[String]) -> Vec<Track> {
    let mut tracks = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if !path.exists() {
            match resolver.resolve(input) {
                Ok(track) => tracks.push(track),
                Err(err) => warn!(input = %input, %err, "skipping input"),
            }
            continue;
        }

        let files = match resolver.collect_files(path) {
            Ok(files) => files,
            Err(err) => {
                warn!(input = %input, %err, "failed to list input");
                continue;
            }
        };
        for file in files {
            match resolver.read_track(&file) {
                Ok(track) => tracks.push(track),
                Err(err) => warn!(path = %file.display(), %err, "skipping file"),
            }
        }
    }

    debug!(inputs = inputs.len(), tracks = tracks.len(), "resolved inputs");
    tracks
}

/// `mm:ss`, or `--:--` when unknown
pub fn format_duration(track: &Track) -> String {
    match track.duration() {
        Some(duration) => {
            let secs = duration.as_secs();
            format!("{:02}:{:02}", secs / 60, secs % 60)
        }
        None => "--:--".to_string(),
    }
}

/// Options of the `run` subcommand
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub random: Option<bool>,
    pub repeat: Option<RepeatMode>,
    pub start_index: usize,

    /// Stop after this long even if the playlist has not finished
    pub limit: Option<Duration>,

    /// Snapshot polling interval
    pub poll: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            random: None,
            repeat: None,
            start_index: 0,
            limit: None,
            poll: Duration::from_millis(20),
        }
    }
}

/// What happened during a `run`
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Titles in the order they started
    pub played: Vec<String>,
    pub final_state: PlayerState,
    pub failures: usize,
}

/// Play `tracks` (or resume the saved playlist when empty) on the simulated
/// decoder until playback ends or the time limit passes
pub fn run_playlist(
    config: &CliConfig,
    tracks: Vec<Track>,
    options: &RunOptions,
) -> Result<RunSummary> {
    let store = Arc::new(JsonFileStore::new(&config.storage.state_dir)?);
    let decoder = Arc::new(ClockDecoder::new(config.clock.settings())?.with_tracks(&tracks));
    let sink = Arc::new(LogSink::new());

    let collaborators = Collaborators::new(decoder.clone())
        .with_store(store)
        .with_sink(sink.clone())
        .with_lookup(Arc::new(LoftyTrackResolver::new()));
    let mut engine = PlaybackEngine::start(config.engine.clone(), collaborators)?;

    if let Some(random) = options.random {
        engine.set_random(random)?;
    }
    if let Some(repeat) = options.repeat {
        engine.set_repeat(repeat)?;
    }

    if tracks.is_empty() {
        // Saved tracks need their durations before the clock can end them
        for track in engine.playlist() {
            if let Some(duration) = track.duration() {
                decoder.register_duration(track.locator.clone(), duration);
            }
        }
        engine.play()?;
    } else {
        engine.play_all(tracks, options.start_index)?;
    }
    engine.flush()?;

    let started = Instant::now();
    let mut played = Vec::new();
    let mut last_seen = None;

    let final_state = loop {
        let snapshot = engine.snapshot();

        if snapshot.state == PlayerState::Playing && snapshot.current_index != last_seen {
            last_seen = snapshot.current_index;
            if let Some(track) = snapshot.current_track() {
                info!(index = ?snapshot.current_index, title = %track.title, "track started");
                played.push(track.title.clone());
            }
        }

        if matches!(snapshot.state, PlayerState::Empty | PlayerState::Stopped) {
            break snapshot.state;
        }

        if options.limit.is_some_and(|limit| started.elapsed() >= limit) {
            info!("time limit reached, stopping");
            engine.stop()?;
            engine.flush()?;
            break engine.snapshot().state;
        }

        thread::sleep(options.poll);
    };

    engine.shutdown()?;
    Ok(RunSummary {
        played,
        final_state,
        failures: sink.failures(),
    })
}

/// Saved playlist and last state
pub fn load_state(state_dir: &Path) -> Result<(Vec<Track>, LastState)> {
    let store = JsonFileStore::new(state_dir)?;
    Ok((store.load_playlist()?, store.load_last_state()?))
}
