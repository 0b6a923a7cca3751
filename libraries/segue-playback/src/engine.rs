//! Playback engine - orchestrator on a dedicated worker thread
//!
//! Commands and decoder signals share one unbounded queue and are processed
//! strictly one at a time. Callers never touch the orchestrator directly; they
//! enqueue and read copied snapshots.

use crate::{
    command::Command,
    config::EngineConfig,
    error::{PlaybackError, Result},
    orchestrator::{Collaborators, Orchestrator},
    types::EngineSnapshot,
};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use segue_core::{RepeatMode, Track};
use segue_transition::{DecoderSignal, SignalSender};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Messages processed by the worker thread
enum EngineMessage {
    Command(Command),
    Decoder(DecoderSignal),
    Position(Sender<Duration>),
    Flush(Sender<()>),
    Shutdown,
}

/// Handle to a running playback engine
///
/// Dropping the handle shuts the worker down (persisting state first).
pub struct PlaybackEngine {
    tx: Sender<EngineMessage>,
    snapshot: Arc<RwLock<EngineSnapshot>>,
    worker: Option<JoinHandle<()>>,
    query_timeout: Duration,
}

impl PlaybackEngine {
    /// Restore persisted state (if configured) and start the worker thread
    pub fn start(config: EngineConfig, collaborators: Collaborators) -> Result<Self> {
        let (tx, rx) = unbounded();

        let signal_tx = tx.clone();
        let signals = SignalSender::new(move |signal| {
            signal_tx.send(EngineMessage::Decoder(signal)).ok();
        });

        let query_timeout = config.query_timeout();
        let orchestrator = Orchestrator::new(config, collaborators, signals);
        let snapshot = Arc::new(RwLock::new(orchestrator.snapshot()));

        let worker_snapshot = snapshot.clone();
        let worker = thread::Builder::new()
            .name("segue-playback".to_string())
            .spawn(move || run_worker(orchestrator, &rx, &worker_snapshot))?;

        info!("playback engine started");
        Ok(Self {
            tx,
            snapshot,
            worker: Some(worker),
            query_timeout,
        })
    }

    /// Enqueue a command (non-blocking)
    pub fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(EngineMessage::Command(command))
            .map_err(|_| PlaybackError::EngineStopped)
    }

    // ===== Command shortcuts =====

    pub fn play(&self) -> Result<()> {
        self.send(Command::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn resume(&self) -> Result<()> {
        self.send(Command::Resume)
    }

    pub fn toggle_pause(&self) -> Result<()> {
        self.send(Command::TogglePause)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Command::Stop)
    }

    pub fn next(&self) -> Result<()> {
        self.send(Command::Next)
    }

    pub fn previous(&self) -> Result<()> {
        self.send(Command::Previous)
    }

    pub fn seek(&self, position: Duration) -> Result<()> {
        self.send(Command::Seek(position.as_millis() as u64))
    }

    pub fn jump_to(&self, index: usize) -> Result<()> {
        self.send(Command::JumpTo(index))
    }

    pub fn enqueue(&self, tracks: Vec<Track>) -> Result<()> {
        self.send(Command::Enqueue(tracks))
    }

    pub fn enqueue_next(&self, track: Track) -> Result<()> {
        self.send(Command::EnqueueNext(track))
    }

    pub fn enqueue_locators(&self, locators: Vec<String>) -> Result<()> {
        self.send(Command::EnqueueLocators(locators))
    }

    pub fn dequeue(&self, index: usize) -> Result<()> {
        self.send(Command::Dequeue(index))
    }

    pub fn clear(&self) -> Result<()> {
        self.send(Command::Clear)
    }

    pub fn shuffle(&self) -> Result<()> {
        self.send(Command::Shuffle)
    }

    pub fn set_random(&self, random: bool) -> Result<()> {
        self.send(Command::SetRandom(random))
    }

    pub fn set_repeat(&self, repeat: RepeatMode) -> Result<()> {
        self.send(Command::SetRepeat(repeat))
    }

    pub fn set_volume(&self, left: f32, right: f32) -> Result<()> {
        self.send(Command::SetVolume(left, right))
    }

    pub fn save(&self) -> Result<()> {
        self.send(Command::Save)
    }

    pub fn play_all(&self, tracks: Vec<Track>, start_index: usize) -> Result<()> {
        self.send(Command::PlayAll {
            tracks,
            start_index,
        })
    }

    // ===== Queries =====

    /// Copy of the state after the most recently processed message
    pub fn snapshot(&self) -> EngineSnapshot {
        match self.snapshot.read() {
            Ok(snapshot) => snapshot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Copy of the playlist
    pub fn playlist(&self) -> Vec<Track> {
        self.snapshot().playlist.to_vec()
    }

    /// Current playback offset, asked of the worker
    pub fn position(&self) -> Result<Duration> {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send(EngineMessage::Position(reply_tx))
            .map_err(|_| PlaybackError::EngineStopped)?;
        reply_rx
            .recv_timeout(self.query_timeout)
            .map_err(|_| PlaybackError::EngineStopped)
    }

    /// Wait until every message enqueued before this call has been processed
    pub fn flush(&self) -> Result<()> {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send(EngineMessage::Flush(reply_tx))
            .map_err(|_| PlaybackError::EngineStopped)?;
        reply_rx
            .recv_timeout(self.query_timeout)
            .map_err(|_| PlaybackError::EngineStopped)
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Persist state, stop playback and join the worker
    pub fn shutdown(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        self.tx.send(EngineMessage::Shutdown).ok();
        worker.join().map_err(|_| PlaybackError::EngineStopped)?;
        info!("playback engine stopped");
        Ok(())
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(%err, "playback worker did not shut down cleanly");
        }
    }
}

fn run_worker(
    mut orchestrator: Orchestrator,
    rx: &Receiver<EngineMessage>,
    snapshot: &RwLock<EngineSnapshot>,
) {
    debug!("playback worker started");
    orchestrator.publish();

    loop {
        // Wake up for the keep-alive deadline even when the queue is idle
        let message = match orchestrator.keep_alive_deadline() {
            Some(deadline) => match rx.recv_deadline(deadline) {
                Ok(message) => Some(message),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(message) => Some(message),
                Err(_) => break,
            },
        };

        // A busy queue can outlive the deadline without ever timing out
        orchestrator.expire_keep_alive(Instant::now());

        match message {
            None => {}
            Some(EngineMessage::Command(command)) => orchestrator.handle(command),
            Some(EngineMessage::Decoder(signal)) => orchestrator.on_decoder_signal(signal),
            Some(EngineMessage::Position(reply)) => {
                reply.send(orchestrator.position()).ok();
                continue;
            }
            Some(EngineMessage::Flush(reply)) => {
                reply.send(()).ok();
                continue;
            }
            Some(EngineMessage::Shutdown) => break,
        }

        orchestrator.publish();
        store_snapshot(snapshot, orchestrator.snapshot());
    }

    orchestrator.shutdown();
    store_snapshot(snapshot, orchestrator.snapshot());
    debug!("playback worker stopped");
}

fn store_snapshot(shared: &RwLock<EngineSnapshot>, snapshot: EngineSnapshot) {
    match shared.write() {
        Ok(mut guard) => *guard = snapshot,
        Err(poisoned) => *poisoned.into_inner() = snapshot,
    }
}
