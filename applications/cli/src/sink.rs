/// Presentation sink that reports to the log
use segue_core::{NowPlaying, PresentationSink};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info};

/// Logs every published snapshot and counts failure notices
#[derive(Debug, Default)]
pub struct LogSink {
    failures: AtomicUsize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failure notices received so far
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}

impl PresentationSink for LogSink {
    fn publish(&self, now_playing: &NowPlaying) {
        match &now_playing.track {
            Some(track) => info!(
                title = %track.title,
                artist = %track.artist,
                playing = now_playing.is_playing,
                random = now_playing.mode.random,
                repeat = %now_playing.mode.repeat,
                tracks = now_playing.playlist_length,
                "now playing"
            ),
            None => info!(tracks = now_playing.playlist_length, "nothing playing"),
        }
    }

    fn report_failure(&self, message: &str) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        error!("{message}");
    }
}
