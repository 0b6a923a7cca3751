//! Decoder slots and the standby preparation gate

use crate::decoder::DecoderHandle;
use crate::error::TransitionError;
use std::sync::Mutex;

/// Preparation progress of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Bound, preparation not started
    Unprepared,

    /// `prepare_async` issued, waiting for `Prepared`
    Preparing,

    /// Ready to start
    Ready,
}

/// Role a slot currently plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRole {
    /// Audible (or about to be)
    Active,

    /// Pre-buffered successor
    Standby,
}

/// One bound decoder instance and the source it plays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub(crate) handle: DecoderHandle,
    pub(crate) source: String,
    pub(crate) readiness: Readiness,
}

impl Slot {
    pub(crate) fn new(handle: DecoderHandle, source: impl Into<String>) -> Self {
        Self {
            handle,
            source: source.into(),
            readiness: Readiness::Unprepared,
        }
    }

    /// Decoder handle bound to this slot
    pub fn handle(&self) -> DecoderHandle {
        self.handle
    }

    /// Locator being played
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Preparation progress
    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }
}

/// Mutex-guarded "standby is preparing" flag
///
/// Both `set_next` and the active slot's ready event can try to start standby
/// preparation; only the first caller through the gate may do so until the
/// flag is cleared by `finish` or `reset`.
#[derive(Debug, Default)]
pub(crate) struct StandbyGate {
    preparing: Mutex<bool>,
}

impl StandbyGate {
    /// Claim the right to start standby preparation
    ///
    /// Returns `Ok(false)` when a preparation is already running and
    /// `Err(Interrupted)` when the guard is unusable.
    pub(crate) fn try_begin(&self) -> Result<bool, TransitionError> {
        let mut preparing = self
            .preparing
            .lock()
            .map_err(|_| TransitionError::Interrupted)?;
        if *preparing {
            return Ok(false);
        }
        *preparing = true;
        Ok(true)
    }

    /// Standby preparation finished (successfully or not)
    pub(crate) fn finish(&self) {
        self.reset();
    }

    /// Clear the flag, recovering from a poisoned guard
    pub(crate) fn reset(&self) {
        match self.preparing.lock() {
            Ok(mut preparing) => *preparing = false,
            Err(poisoned) => {
                *poisoned.into_inner() = false;
                self.preparing.clear_poison();
            }
        }
    }

    pub(crate) fn is_preparing(&self) -> bool {
        self.preparing.lock().map(|p| *p).unwrap_or(false)
    }
}
