//! Wall-clock simulated decoder
//!
//! Plays nothing; tracks media time against the system clock so the engine
//! can be exercised end to end without an audio device. A single driver
//! thread finishes preparations after a fixed latency and reports completion
//! when an instance's media time reaches its duration.

use crate::decoder::{Decoder, DecoderHandle, DecoderSignal, SignalSender};
use crate::error::SourceError;
use crossbeam_channel::{bounded, Sender};
use segue_core::Track;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Simulation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ClockSettings {
    /// Media seconds per wall-clock second
    pub speed: f64,

    /// Delay between `prepare_async` and `Prepared`
    pub prepare_latency: Duration,

    /// Duration for sources with no registered duration
    pub default_duration: Duration,

    /// Driver polling interval
    pub tick: Duration,

    /// Reject local paths that do not exist or cannot be read
    pub check_files: bool,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            prepare_latency: Duration::from_millis(50),
            default_duration: Duration::from_secs(180),
            tick: Duration::from_millis(10),
            check_files: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Bound,
    Preparing { ready_at: Instant },
    Ready,
    Playing { since: Instant },
    Finished,
}

struct ClockInstance {
    locator: String,
    signals: SignalSender,
    phase: Phase,
    /// Media time accumulated before the current `Playing` stretch
    elapsed: Duration,
    duration: Duration,
}

impl ClockInstance {
    fn position(&self, speed: f64, now: Instant) -> Duration {
        let running = match self.phase {
            Phase::Playing { since } => {
                let wall = now.saturating_duration_since(since).as_secs_f64();
                Duration::try_from_secs_f64(wall * speed).unwrap_or(self.duration)
            }
            _ => Duration::ZERO,
        };
        (self.elapsed + running).min(self.duration)
    }
}

#[derive(Default)]
struct ClockState {
    next_id: u64,
    instances: HashMap<DecoderHandle, ClockInstance>,
    durations: HashMap<String, Duration>,
}

struct Shared {
    settings: ClockSettings,
    state: Mutex<ClockState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Advance every instance to `now`; returns the signals to deliver
    fn poll(&self, now: Instant) -> Vec<(SignalSender, DecoderSignal)> {
        let speed = self.settings.speed;
        let mut state = self.lock();
        let mut due = Vec::new();

        for (handle, instance) in &mut state.instances {
            match instance.phase {
                Phase::Preparing { ready_at } if now >= ready_at => {
                    instance.phase = Phase::Ready;
                    due.push((instance.signals.clone(), DecoderSignal::Prepared(*handle)));
                }
                Phase::Playing { .. } if instance.position(speed, now) >= instance.duration => {
                    instance.elapsed = instance.duration;
                    instance.phase = Phase::Finished;
                    due.push((instance.signals.clone(), DecoderSignal::Completed(*handle)));
                }
                _ => {}
            }
        }
        due
    }
}

/// Decoder that simulates playback against the wall clock
pub struct ClockDecoder {
    shared: Arc<Shared>,
    shutdown_tx: Sender<()>,
    driver: Option<JoinHandle<()>>,
}

impl ClockDecoder {
    /// Start a clock decoder and its driver thread
    pub fn new(settings: ClockSettings) -> io::Result<Self> {
        let shared = Arc::new(Shared {
            settings,
            state: Mutex::new(ClockState::default()),
        });
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let driver_shared = shared.clone();
        let driver = thread::Builder::new()
            .name("segue-clock".to_string())
            .spawn(move || {
                let tick = crossbeam_channel::tick(driver_shared.settings.tick);
                loop {
                    crossbeam_channel::select! {
                        recv(shutdown_rx) -> _ => break,
                        recv(tick) -> msg => {
                            let Ok(now) = msg else { break };
                            // Delivered outside the state lock
                            for (sender, signal) in driver_shared.poll(now) {
                                trace!(?signal, "clock decoder signal");
                                sender.send(signal);
                            }
                        }
                    }
                }
                debug!("clock decoder driver stopped");
            })?;

        Ok(Self {
            shared,
            shutdown_tx,
            driver: Some(driver),
        })
    }

    /// Register the duration reported for `locator`
    pub fn register_duration(&self, locator: impl Into<String>, duration: Duration) {
        self.shared.lock().durations.insert(locator.into(), duration);
    }

    /// Register durations for every track that carries one
    pub fn with_tracks(self, tracks: &[Track]) -> Self {
        for track in tracks {
            if let Some(duration) = track.duration() {
                self.register_duration(track.locator.clone(), duration);
            }
        }
        self
    }

    fn validate(&self, locator: &str) -> Result<(), SourceError> {
        if locator.trim().is_empty() {
            return Err(SourceError::ArgumentInvalid);
        }
        if !self.shared.settings.check_files || locator.contains("://") {
            return Ok(());
        }

        let metadata = std::fs::metadata(Path::new(locator))?;
        if metadata.is_dir() {
            return Err(SourceError::ArgumentInvalid);
        }
        Ok(())
    }

    fn update(&self, handle: DecoderHandle, f: impl FnOnce(&mut ClockInstance, Instant, f64)) {
        let speed = self.shared.settings.speed;
        if let Some(instance) = self.shared.lock().instances.get_mut(&handle) {
            f(instance, Instant::now(), speed);
        }
    }
}

impl Decoder for ClockDecoder {
    fn bind(&self, locator: &str, signals: SignalSender) -> Result<DecoderHandle, SourceError> {
        self.validate(locator)?;

        let mut state = self.shared.lock();
        let duration = state
            .durations
            .get(locator)
            .copied()
            .unwrap_or(self.shared.settings.default_duration);

        state.next_id += 1;
        let handle = DecoderHandle::new(state.next_id);
        state.instances.insert(
            handle,
            ClockInstance {
                locator: locator.to_string(),
                signals,
                phase: Phase::Bound,
                elapsed: Duration::ZERO,
                duration,
            },
        );
        trace!(locator, %handle, "clock decoder bound");
        Ok(handle)
    }

    fn prepare_async(&self, handle: DecoderHandle) {
        let latency = self.shared.settings.prepare_latency;
        self.update(handle, |instance, now, _| {
            if instance.phase == Phase::Bound {
                instance.phase = Phase::Preparing {
                    ready_at: now + latency,
                };
            }
        });
    }

    fn start(&self, handle: DecoderHandle) {
        self.update(handle, |instance, now, _| {
            if instance.phase == Phase::Ready {
                instance.phase = Phase::Playing { since: now };
            }
        });
    }

    fn pause(&self, handle: DecoderHandle) {
        self.update(handle, |instance, now, speed| {
            if let Phase::Playing { .. } = instance.phase {
                instance.elapsed = instance.position(speed, now);
                instance.phase = Phase::Ready;
            }
        });
    }

    fn release(&self, handle: DecoderHandle) {
        if let Some(instance) = self.shared.lock().instances.remove(&handle) {
            trace!(locator = %instance.locator, %handle, "clock decoder released");
        }
    }

    fn seek(&self, handle: DecoderHandle, position: Duration) {
        self.update(handle, |instance, now, _| {
            instance.elapsed = position.min(instance.duration);
            if let Phase::Playing { .. } = instance.phase {
                instance.phase = Phase::Playing { since: now };
            }
        });
    }

    fn position_of(&self, handle: DecoderHandle) -> Duration {
        let speed = self.shared.settings.speed;
        self.shared
            .lock()
            .instances
            .get(&handle)
            .map(|i| i.position(speed, Instant::now()))
            .unwrap_or_default()
    }

    fn duration_of(&self, handle: DecoderHandle) -> Option<Duration> {
        self.shared.lock().instances.get(&handle).map(|i| i.duration)
    }

    fn set_volume(&self, handle: DecoderHandle, left: f32, right: f32) {
        trace!(%handle, left, right, "clock decoder volume");
    }
}

impl Drop for ClockDecoder {
    fn drop(&mut self) {
        self.shutdown_tx.try_send(()).ok();
        if let Some(driver) = self.driver.take() {
            driver.join().ok();
        }
    }
}
