//! Scripted decoder for tests
//!
//! Records every call and lets the test decide when preparation finishes, when
//! a track ends and when a decoder fails. Signals are addressed by locator and
//! go to the most recently bound live instance for that locator.

use crate::decoder::{Decoder, DecoderHandle, DecoderSignal, SignalSender};
use crate::error::SourceError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// One recorded decoder call, keyed by locator
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderCall {
    Bind(String),
    Prepare(String),
    Start(String),
    Pause(String),
    Release(String),
    Seek(String, Duration),
    SetVolume(String, f32, f32),
    LinkNext(String, Option<String>),
}

struct Instance {
    locator: String,
    signals: SignalSender,
    position: Duration,
    playing: bool,
    released: bool,
}

#[derive(Default)]
struct ScriptState {
    next_id: u64,
    instances: HashMap<DecoderHandle, Instance>,
    bind_failures: HashMap<String, SourceError>,
    durations: HashMap<String, Duration>,
    calls: Vec<DecoderCall>,
    auto_prepare: bool,
}

impl ScriptState {
    fn locator(&self, handle: DecoderHandle) -> String {
        self.instances
            .get(&handle)
            .map(|i| i.locator.clone())
            .unwrap_or_default()
    }

    fn latest_live(&self, locator: &str) -> Option<DecoderHandle> {
        self.instances
            .iter()
            .filter(|(_, i)| i.locator == locator && !i.released)
            .map(|(handle, _)| *handle)
            .max()
    }
}

/// Decoder whose asynchronous behaviour is driven by the test
#[derive(Default)]
pub struct ScriptedDecoder {
    state: Mutex<ScriptState>,
}

impl ScriptedDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that reports `Prepared` as soon as preparation is requested
    pub fn auto_prepare() -> Self {
        let decoder = Self::new();
        decoder.lock().auto_prepare = true;
        decoder
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ===== Scripting =====

    /// Make every future bind of `locator` fail with `error`
    pub fn fail_bind(&self, locator: &str, error: SourceError) {
        self.lock().bind_failures.insert(locator.to_string(), error);
    }

    /// Undo `fail_bind`
    pub fn allow_bind(&self, locator: &str) {
        self.lock().bind_failures.remove(locator);
    }

    /// Duration reported for `locator`
    pub fn set_duration(&self, locator: &str, duration: Duration) {
        self.lock()
            .durations
            .insert(locator.to_string(), duration);
    }

    /// Move the playback offset of the live instance for `locator`
    pub fn set_position(&self, locator: &str, position: Duration) {
        let mut state = self.lock();
        if let Some(handle) = state.latest_live(locator) {
            if let Some(instance) = state.instances.get_mut(&handle) {
                instance.position = position;
            }
        }
    }

    /// Finish preparation of `locator`; returns whether a live instance existed
    pub fn prepared(&self, locator: &str) -> bool {
        self.signal_locator(locator, DecoderSignal::Prepared)
    }

    /// Report natural end of `locator`
    pub fn completed(&self, locator: &str) -> bool {
        self.signal_locator(locator, DecoderSignal::Completed)
    }

    /// Report a decoder failure for `locator`
    pub fn failed(&self, locator: &str, error: SourceError) -> bool {
        self.signal_locator(locator, |handle| DecoderSignal::Failed(handle, error))
    }

    /// Deliver an arbitrary signal, even for a released handle
    pub fn signal(&self, signal: DecoderSignal) {
        let sender = self
            .lock()
            .instances
            .get(&signal.handle())
            .map(|i| i.signals.clone());
        if let Some(sender) = sender {
            sender.send(signal);
        }
    }

    fn signal_locator(&self, locator: &str, make: impl FnOnce(DecoderHandle) -> DecoderSignal) -> bool {
        let target = {
            let state = self.lock();
            state.latest_live(locator).and_then(|handle| {
                state
                    .instances
                    .get(&handle)
                    .map(|i| (handle, i.signals.clone()))
            })
        };
        // Lock released before delivery
        match target {
            Some((handle, sender)) => {
                sender.send(make(handle));
                true
            }
            None => false,
        }
    }

    // ===== Inspection =====

    pub fn calls(&self) -> Vec<DecoderCall> {
        self.lock().calls.clone()
    }

    pub fn take_calls(&self) -> Vec<DecoderCall> {
        std::mem::take(&mut self.lock().calls)
    }

    /// Number of recorded calls equal to `call`
    pub fn count(&self, call: &DecoderCall) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    /// Most recent unreleased handle bound to `locator`
    pub fn live_handle(&self, locator: &str) -> Option<DecoderHandle> {
        self.lock().latest_live(locator)
    }

    pub fn is_live(&self, locator: &str) -> bool {
        self.live_handle(locator).is_some()
    }

    /// Number of unreleased instances
    pub fn live_count(&self) -> usize {
        self.lock()
            .instances
            .values()
            .filter(|i| !i.released)
            .count()
    }

    pub fn is_playing(&self, locator: &str) -> bool {
        let state = self.lock();
        state
            .latest_live(locator)
            .and_then(|handle| state.instances.get(&handle))
            .is_some_and(|i| i.playing)
    }

    /// Locators of every playing instance
    pub fn playing(&self) -> Vec<String> {
        let state = self.lock();
        let mut playing: Vec<_> = state
            .instances
            .iter()
            .filter(|(_, i)| i.playing && !i.released)
            .map(|(handle, i)| (*handle, i.locator.clone()))
            .collect();
        playing.sort();
        playing.into_iter().map(|(_, locator)| locator).collect()
    }

    pub fn position(&self, locator: &str) -> Option<Duration> {
        let state = self.lock();
        state
            .latest_live(locator)
            .and_then(|handle| state.instances.get(&handle))
            .map(|i| i.position)
    }
}

impl Decoder for ScriptedDecoder {
    fn bind(&self, locator: &str, signals: SignalSender) -> Result<DecoderHandle, SourceError> {
        let mut state = self.lock();
        state.calls.push(DecoderCall::Bind(locator.to_string()));
        if let Some(error) = state.bind_failures.get(locator) {
            return Err(*error);
        }

        state.next_id += 1;
        let handle = DecoderHandle::new(state.next_id);
        state.instances.insert(
            handle,
            Instance {
                locator: locator.to_string(),
                signals,
                position: Duration::ZERO,
                playing: false,
                released: false,
            },
        );
        Ok(handle)
    }

    fn prepare_async(&self, handle: DecoderHandle) {
        let auto = {
            let mut state = self.lock();
            let locator = state.locator(handle);
            state.calls.push(DecoderCall::Prepare(locator));
            state
                .auto_prepare
                .then(|| state.instances.get(&handle).map(|i| i.signals.clone()))
                .flatten()
        };
        if let Some(sender) = auto {
            sender.send(DecoderSignal::Prepared(handle));
        }
    }

    fn start(&self, handle: DecoderHandle) {
        let mut state = self.lock();
        let locator = state.locator(handle);
        state.calls.push(DecoderCall::Start(locator));
        if let Some(instance) = state.instances.get_mut(&handle) {
            instance.playing = !instance.released;
        }
    }

    fn pause(&self, handle: DecoderHandle) {
        let mut state = self.lock();
        let locator = state.locator(handle);
        state.calls.push(DecoderCall::Pause(locator));
        if let Some(instance) = state.instances.get_mut(&handle) {
            instance.playing = false;
        }
    }

    fn release(&self, handle: DecoderHandle) {
        let mut state = self.lock();
        let locator = state.locator(handle);
        state.calls.push(DecoderCall::Release(locator));
        if let Some(instance) = state.instances.get_mut(&handle) {
            instance.playing = false;
            instance.released = true;
        }
    }

    fn seek(&self, handle: DecoderHandle, position: Duration) {
        let mut state = self.lock();
        let locator = state.locator(handle);
        state.calls.push(DecoderCall::Seek(locator, position));
        if let Some(instance) = state.instances.get_mut(&handle) {
            instance.position = position;
        }
    }

    fn position_of(&self, handle: DecoderHandle) -> Duration {
        self.lock()
            .instances
            .get(&handle)
            .map(|i| i.position)
            .unwrap_or_default()
    }

    fn duration_of(&self, handle: DecoderHandle) -> Option<Duration> {
        let state = self.lock();
        let locator = state.instances.get(&handle)?.locator.clone();
        state.durations.get(&locator).copied()
    }

    fn set_volume(&self, handle: DecoderHandle, left: f32, right: f32) {
        let mut state = self.lock();
        let locator = state.locator(handle);
        state.calls.push(DecoderCall::SetVolume(locator, left, right));
    }

    fn link_next(&self, current: DecoderHandle, next: Option<DecoderHandle>) {
        let mut state = self.lock();
        let current = state.locator(current);
        let next = next.map(|handle| state.locator(handle));
        state.calls.push(DecoderCall::LinkNext(current, next));
    }
}
