//! Platform-agnostic decoder capability
//!
//! Abstracts the native player for different backends. The controller only
//! ever sees opaque handles; everything asynchronous (preparation finished,
//! natural end of track, decoder failure) comes back as a `DecoderSignal`
//! through the `SignalSender` given at bind time.

use crate::error::SourceError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Opaque identifier for one bound decoder instance
///
/// Handles are never reused by a decoder, so a signal carrying a released
/// handle can be recognised as stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecoderHandle(u64);

impl DecoderHandle {
    /// Wrap a raw decoder-assigned id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DecoderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decoder#{}", self.0)
    }
}

/// Asynchronous notification from a decoder instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderSignal {
    /// Preparation finished; the handle can be started
    Prepared(DecoderHandle),

    /// Playback reached the natural end of the source
    Completed(DecoderHandle),

    /// Preparation or playback failed
    Failed(DecoderHandle, SourceError),
}

impl DecoderSignal {
    /// Handle the signal refers to
    pub fn handle(&self) -> DecoderHandle {
        match self {
            Self::Prepared(handle) | Self::Completed(handle) | Self::Failed(handle, _) => *handle,
        }
    }
}

/// Delivery path for decoder signals
///
/// Cloned into every bound decoder. The receiving side decides which thread
/// acts on the signal; decoders must never call back into the controller.
#[derive(Clone)]
pub struct SignalSender {
    deliver: Arc<dyn Fn(DecoderSignal) + Send + Sync>,
}

impl SignalSender {
    /// Build a sender from a delivery function
    pub fn new(deliver: impl Fn(DecoderSignal) + Send + Sync + 'static) -> Self {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    /// Sender backed by a crossbeam channel; send failures are dropped
    pub fn from_channel(tx: crossbeam_channel::Sender<DecoderSignal>) -> Self {
        Self::new(move |signal| {
            tx.send(signal).ok();
        })
    }

    /// Deliver one signal
    pub fn send(&self, signal: DecoderSignal) {
        (self.deliver)(signal);
    }
}

impl fmt::Debug for SignalSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalSender").finish_non_exhaustive()
    }
}

/// Decoder capability used by the transition controller
///
/// Implementors own the real audio pipeline (native player, Symphonia + CPAL,
/// a simulation). All methods take `&self` so one decoder can back both slots.
pub trait Decoder: Send + Sync {
    /// Open `locator` and allocate a decoder instance
    ///
    /// Synchronous setup only: must fail fast on an invalid source and must not
    /// start buffering audio.
    fn bind(&self, locator: &str, signals: SignalSender) -> Result<DecoderHandle, SourceError>;

    /// Begin asynchronous preparation; completion arrives as `Prepared`
    fn prepare_async(&self, handle: DecoderHandle);

    /// Start or resume audible playback
    fn start(&self, handle: DecoderHandle);

    /// Pause playback, keeping the position
    fn pause(&self, handle: DecoderHandle);

    /// Stop and free the instance; no signal for `handle` may follow
    fn release(&self, handle: DecoderHandle);

    /// Non-blocking seek
    fn seek(&self, handle: DecoderHandle, position: Duration);

    /// Current playback offset
    fn position_of(&self, handle: DecoderHandle) -> Duration;

    /// Total duration once prepared
    fn duration_of(&self, handle: DecoderHandle) -> Option<Duration>;

    /// Per-channel gain in `[0, 1]`
    fn set_volume(&self, handle: DecoderHandle, left: f32, right: f32);

    /// Hint that `next` should follow `current` without a gap
    ///
    /// Backends with native chaining start `next` themselves when `current`
    /// completes; `start` on an already running handle must then be a no-op.
    fn link_next(&self, current: DecoderHandle, next: Option<DecoderHandle>) {
        let _ = (current, next);
    }
}

impl<T: Decoder + ?Sized> Decoder for Arc<T> {
    fn bind(&self, locator: &str, signals: SignalSender) -> Result<DecoderHandle, SourceError> {
        (**self).bind(locator, signals)
    }

    fn prepare_async(&self, handle: DecoderHandle) {
        (**self).prepare_async(handle);
    }

    fn start(&self, handle: DecoderHandle) {
        (**self).start(handle);
    }

    fn pause(&self, handle: DecoderHandle) {
        (**self).pause(handle);
    }

    fn release(&self, handle: DecoderHandle) {
        (**self).release(handle);
    }

    fn seek(&self, handle: DecoderHandle, position: Duration) {
        (**self).seek(handle, position);
    }

    fn position_of(&self, handle: DecoderHandle) -> Duration {
        (**self).position_of(handle)
    }

    fn duration_of(&self, handle: DecoderHandle) -> Option<Duration> {
        (**self).duration_of(handle)
    }

    fn set_volume(&self, handle: DecoderHandle, left: f32, right: f32) {
        (**self).set_volume(handle, left, right);
    }

    fn link_next(&self, current: DecoderHandle, next: Option<DecoderHandle>) {
        (**self).link_next(current, next);
    }
}
