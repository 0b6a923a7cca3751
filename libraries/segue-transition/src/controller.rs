//! Transition controller - gapless handoff between two decoder slots
//!
//! The controller owns exactly two slots indexed by role: `active` (audible)
//! and `standby` (pre-buffered successor). A handoff moves the standby slot
//! into the active role; the old active instance is released afterwards, so no
//! reference to a torn-down decoder survives.
//!
//! The controller is driven by its owner: explicit calls (`play`, `set_next`,
//! `pause`, ...) and decoder signals fed through `on_signal`. Decoder signals
//! never reach the controller directly; they travel through the
//! `SignalSender` to whatever queue the owner reads.

use crate::{
    decoder::{Decoder, DecoderHandle, DecoderSignal, SignalSender},
    error::{Result, SourceError, TransitionError},
    events::TransitionEvent,
    slot::{Readiness, Slot, SlotRole, StandbyGate},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Transport state of the active slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Nothing audible (idle, preparing, or torn down)
    Stopped,

    /// Active slot is playing
    Playing,

    /// Active slot is paused mid-track
    Paused,
}

/// Two-slot decoder transition controller
pub struct TransitionController {
    decoder: Arc<dyn Decoder>,
    signals: SignalSender,

    // Slots
    active: Option<Slot>,
    standby: Option<Slot>,
    gate: StandbyGate,

    // Active slot transport
    transport: Transport,
    started: bool,
    start_offset: Duration,
    paused_at: Option<Duration>,

    // Carried across handoffs
    volume: (f32, f32),
}

impl TransitionController {
    /// Create a controller; every bound decoder reports through `signals`
    pub fn new(decoder: Arc<dyn Decoder>, signals: SignalSender) -> Self {
        Self {
            decoder,
            signals,
            active: None,
            standby: None,
            gate: StandbyGate::default(),
            transport: Transport::Stopped,
            started: false,
            start_offset: Duration::ZERO,
            paused_at: None,
            volume: (1.0, 1.0),
        }
    }

    /// Bind `source` to a fresh active decoder and start preparing it
    ///
    /// Any existing active decoder is torn down first. An armed standby slot
    /// is kept; its preparation starts once the new active track is audible.
    ///
    /// # Errors
    /// Returns the decoder's `SourceError` if the source cannot be opened; the
    /// active slot is empty afterwards.
    pub fn play(&mut self, source: &str, start_offset: Duration) -> Result<()> {
        self.release_active();

        let handle = self
            .decoder
            .bind(source, self.signals.clone())
            .map_err(|err| {
                warn!(source, %err, "failed to bind active decoder");
                TransitionError::Source(err)
            })?;

        let mut slot = Slot::new(handle, source);
        slot.readiness = Readiness::Preparing;
        self.active = Some(slot);
        self.start_offset = start_offset;
        self.paused_at = None;
        self.transport = Transport::Stopped;
        self.started = false;

        debug!(source, %handle, offset_ms = start_offset.as_millis() as u64, "preparing active decoder");
        self.decoder.prepare_async(handle);
        Ok(())
    }

    /// Arm the standby slot with `source`, or clear it with `None`
    ///
    /// An existing standby decoder is torn down first. Preparation starts right
    /// away when the active slot is ready, otherwise when it becomes ready.
    ///
    /// # Errors
    /// - `NoActiveDecoder` when nothing is bound to the active slot
    /// - `Source` when the decoder refuses `source` (standby stays empty)
    pub fn set_next(&mut self, source: Option<&str>) -> Result<()> {
        let Some(active) = self.active.as_ref() else {
            return Err(TransitionError::NoActiveDecoder);
        };
        let active_ready = active.is_ready();

        self.release_standby();

        let Some(source) = source else {
            debug!("standby cleared");
            return Ok(());
        };

        let handle = self
            .decoder
            .bind(source, self.signals.clone())
            .map_err(TransitionError::Source)?;
        self.standby = Some(Slot::new(handle, source));
        debug!(source, %handle, "standby armed");

        if active_ready {
            self.begin_standby_preparation();
        }
        Ok(())
    }

    /// Process one decoder signal and return the resulting events
    ///
    /// Signals for handles no longer bound to a slot are dropped.
    pub fn on_signal(&mut self, signal: DecoderSignal) -> Vec<TransitionEvent> {
        match signal {
            DecoderSignal::Prepared(handle) => self.on_prepared(handle),
            DecoderSignal::Completed(handle) => self.on_completed(handle),
            DecoderSignal::Failed(handle, error) => self.on_failed(handle, error),
        }
    }

    /// Pause the active decoder; returns whether anything changed
    pub fn pause(&mut self) -> bool {
        if self.transport != Transport::Playing {
            return false;
        }
        let Some(handle) = self.ready_active_handle() else {
            return false;
        };

        self.paused_at = Some(self.decoder.position_of(handle));
        self.decoder.pause(handle);
        self.transport = Transport::Paused;
        true
    }

    /// Resume a paused active decoder; returns whether anything changed
    pub fn resume(&mut self) -> bool {
        if self.transport != Transport::Paused {
            return false;
        }
        let Some(handle) = self.ready_active_handle() else {
            return false;
        };

        self.decoder.start(handle);
        self.transport = Transport::Playing;
        self.paused_at = None;
        true
    }

    /// Pause when playing, resume when paused
    pub fn toggle_pause(&mut self) -> bool {
        match self.transport {
            Transport::Playing => self.pause(),
            Transport::Paused => self.resume(),
            Transport::Stopped => false,
        }
    }

    /// Tear down both slots
    ///
    /// Safe at any time, including mid-preparation. Calling it twice is the
    /// same as calling it once.
    pub fn stop(&mut self) {
        if self.active.is_some() || self.standby.is_some() {
            debug!("stopping transition controller");
        }
        self.release_standby();
        self.release_active();
        self.transport = Transport::Stopped;
        self.started = false;
        self.start_offset = Duration::ZERO;
        self.paused_at = None;
    }

    /// Seek the active decoder
    ///
    /// Ignored (returns `false`) when no decoder is ready or `position` lies
    /// beyond the track's duration.
    pub fn seek(&mut self, position: Duration) -> bool {
        let Some(handle) = self.ready_active_handle() else {
            debug!("seek ignored: no prepared decoder");
            return false;
        };

        if let Some(duration) = self.decoder.duration_of(handle) {
            if position > duration {
                debug!(
                    position_ms = position.as_millis() as u64,
                    duration_ms = duration.as_millis() as u64,
                    "seek ignored: past end of track"
                );
                return false;
            }
        }

        self.decoder.seek(handle, position);
        if self.transport == Transport::Paused {
            self.paused_at = Some(position);
        }
        true
    }

    /// Last known playback offset of the active slot
    ///
    /// While paused this is the offset captured at pause time; while preparing
    /// it is the requested start offset.
    pub fn position(&self) -> Duration {
        match (self.transport, self.active.as_ref()) {
            (Transport::Paused, _) => self.paused_at.unwrap_or_default(),
            (Transport::Playing, Some(active)) => self.decoder.position_of(active.handle),
            (Transport::Stopped, Some(_)) => self.start_offset,
            _ => Duration::ZERO,
        }
    }

    /// Set per-channel volume, clamped to `[0, 1]`
    pub fn set_volume(&mut self, left: f32, right: f32) {
        self.volume = (left.clamp(0.0, 1.0), right.clamp(0.0, 1.0));
        if let Some(active) = self.active.as_ref() {
            self.decoder
                .set_volume(active.handle, self.volume.0, self.volume.1);
        }
    }

    // ===== State accessors =====

    /// Transport state of the active slot
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Whether the active slot is audible
    pub fn is_playing(&self) -> bool {
        self.transport == Transport::Playing
    }

    /// Whether the active slot is paused
    pub fn is_paused(&self) -> bool {
        self.transport == Transport::Paused
    }

    /// Whether a decoder is bound to the active slot
    pub fn has_session(&self) -> bool {
        self.active.is_some()
    }

    /// Slot currently holding `role`
    pub fn slot(&self, role: SlotRole) -> Option<&Slot> {
        match role {
            SlotRole::Active => self.active.as_ref(),
            SlotRole::Standby => self.standby.as_ref(),
        }
    }

    /// Locator bound to the active slot
    pub fn active_source(&self) -> Option<&str> {
        self.active.as_ref().map(Slot::source)
    }

    /// Locator bound to the standby slot
    pub fn standby_source(&self) -> Option<&str> {
        self.standby.as_ref().map(Slot::source)
    }

    /// Whether a standby preparation is in flight
    pub fn standby_preparing(&self) -> bool {
        self.gate.is_preparing()
    }

    /// Current volume
    pub fn volume(&self) -> (f32, f32) {
        self.volume
    }

    // ===== Signal handling =====

    fn on_prepared(&mut self, handle: DecoderHandle) -> Vec<TransitionEvent> {
        if let Some(active) = self.active.as_mut().filter(|slot| slot.handle == handle) {
            active.readiness = Readiness::Ready;
            let source = active.source.clone();

            if !self.start_offset.is_zero() {
                self.decoder.seek(handle, self.start_offset);
                self.start_offset = Duration::ZERO;
            }
            self.decoder.set_volume(handle, self.volume.0, self.volume.1);
            self.decoder.start(handle);
            self.transport = Transport::Playing;
            self.started = true;
            info!(source = %source, "track started");

            // Standby armed while the active slot was preparing
            self.begin_standby_preparation();

            return vec![TransitionEvent::TrackStarted { source }];
        }

        if let Some(standby) = self.standby.as_mut().filter(|slot| slot.handle == handle) {
            standby.readiness = Readiness::Ready;
            self.gate.finish();
            debug!(source = %standby.source, "standby ready");
            if let Some(active) = self.active.as_ref() {
                self.decoder.link_next(active.handle, Some(handle));
            }
            return Vec::new();
        }

        trace!(%handle, "dropping stale prepared signal");
        Vec::new()
    }

    fn on_completed(&mut self, handle: DecoderHandle) -> Vec<TransitionEvent> {
        if self.active.as_ref().map(Slot::handle) != Some(handle) {
            trace!(%handle, "dropping stale completion signal");
            return Vec::new();
        }
        let Some(finished) = self.active.take() else {
            return Vec::new();
        };

        let standby_ready = self.standby.as_ref().is_some_and(Slot::is_ready);
        match self.standby.take() {
            Some(next) if standby_ready => {
                // Promote standby; start before releasing the old instance
                self.decoder
                    .set_volume(next.handle, self.volume.0, self.volume.1);
                self.decoder.start(next.handle);
                self.decoder.release(finished.handle);

                info!(from = %finished.source, to = %next.source, "gapless handoff");
                let source = next.source.clone();
                self.active = Some(next);
                self.transport = Transport::Playing;
                self.started = true;
                self.paused_at = None;

                vec![TransitionEvent::TrackStarted { source }]
            }
            standby => {
                self.decoder.release(finished.handle);
                if let Some(pending) = standby {
                    debug!(source = %pending.source, "dropping unprepared standby");
                    self.decoder.release(pending.handle);
                    self.gate.reset();
                }
                self.transport = Transport::Stopped;
                self.started = false;
                self.paused_at = None;
                info!(source = %finished.source, "track finished without prepared successor");

                vec![TransitionEvent::TrackFinished {
                    source: finished.source,
                }]
            }
        }
    }

    fn on_failed(&mut self, handle: DecoderHandle, error: SourceError) -> Vec<TransitionEvent> {
        if self.active.as_ref().map(Slot::handle) == Some(handle) {
            let Some(failed) = self.active.take() else {
                return Vec::new();
            };
            let started = self.started;

            self.decoder.release(failed.handle);
            self.release_standby();
            self.transport = Transport::Stopped;
            self.started = false;
            self.paused_at = None;
            self.start_offset = Duration::ZERO;
            warn!(source = %failed.source, %error, started, "active decoder failed");

            return vec![TransitionEvent::TrackFailed {
                source: failed.source,
                error,
                started,
            }];
        }

        if self.standby.as_ref().map(Slot::handle) == Some(handle) {
            if let Some(standby) = self.standby.as_ref() {
                warn!(source = %standby.source, %error, "standby decoder failed, successor dropped");
            }
            self.release_standby();
            return Vec::new();
        }

        trace!(%handle, "dropping stale failure signal");
        Vec::new()
    }

    // ===== Slot management =====

    fn ready_active_handle(&self) -> Option<DecoderHandle> {
        self.active
            .as_ref()
            .filter(|slot| slot.is_ready())
            .map(Slot::handle)
    }

    fn begin_standby_preparation(&mut self) {
        let Some(standby) = self.standby.as_mut() else {
            return;
        };
        if standby.readiness != Readiness::Unprepared {
            return;
        }

        match self.gate.try_begin() {
            Ok(true) => {
                standby.readiness = Readiness::Preparing;
                debug!(source = %standby.source, "preparing standby decoder");
                self.decoder.prepare_async(standby.handle);
            }
            Ok(false) => debug!("standby preparation already running"),
            Err(err) => warn!(%err, "standby arming abandoned for this cycle"),
        }
    }

    fn release_active(&mut self) {
        if let Some(active) = self.active.take() {
            trace!(source = %active.source, handle = %active.handle, "releasing active decoder");
            self.decoder.release(active.handle);
        }
    }

    fn release_standby(&mut self) {
        if let Some(standby) = self.standby.take() {
            if let Some(active) = self.active.as_ref() {
                self.decoder.link_next(active.handle, None);
            }
            trace!(source = %standby.source, handle = %standby.handle, "releasing standby decoder");
            self.decoder.release(standby.handle);
        }
        self.gate.reset();
    }
}

impl Drop for TransitionController {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionController")
            .field("active", &self.active)
            .field("standby", &self.standby)
            .field("transport", &self.transport)
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}
