//! Orchestrator scenarios driven by a scripted decoder
//!
//! Each test plays the decoder's part by hand: it decides when a track has
//! finished preparing, when it ends and when it fails, then checks indices,
//! the armed standby slot and what the collaborators saw.

use crossbeam_channel::Receiver;
use segue_core::{
    LastState, MetadataLookup, NowPlaying, PlaybackMode, PlaylistStore, PresentationSink,
    RepeatMode, SegueError, Track,
};
use segue_playback::{
    Collaborators, Command, EngineConfig, KeepAlive, Orchestrator, PlaybackError, PlayerState,
};
use segue_storage::MemoryStore;
use segue_transition::testing::{DecoderCall, ScriptedDecoder};
use segue_transition::{DecoderSignal, SignalSender, SlotRole, SourceError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// ============================================================================
// HELPERS
// ============================================================================

fn track(name: &str) -> Track {
    Track::new(format!("Track {name}"), loc(name)).with_duration_ms(180_000)
}

fn loc(name: &str) -> String {
    format!("/music/{name}.flac")
}

fn tracks(names: &[&str]) -> Vec<Track> {
    names.iter().map(|n| track(n)).collect()
}

#[derive(Default)]
struct RecordingSink {
    published: Mutex<Vec<NowPlaying>>,
    failures: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn published(&self) -> Vec<NowPlaying> {
        self.published.lock().unwrap().clone()
    }

    fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

impl PresentationSink for RecordingSink {
    fn publish(&self, now_playing: &NowPlaying) {
        self.published.lock().unwrap().push(now_playing.clone());
    }

    fn report_failure(&self, message: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
struct CountingKeepAlive(AtomicI32);

impl KeepAlive for CountingKeepAlive {
    fn acquire(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct StaticLookup(HashMap<String, Track>);

impl MetadataLookup for StaticLookup {
    fn resolve(&self, locator: &str) -> segue_core::Result<Track> {
        self.0
            .get(locator)
            .cloned()
            .ok_or_else(|| SegueError::not_found("Track", locator))
    }
}

struct Harness {
    orchestrator: Orchestrator,
    decoder: Arc<ScriptedDecoder>,
    rx: Receiver<DecoderSignal>,
    sink: Arc<RecordingSink>,
    store: Arc<MemoryStore>,
    keep_alive: Arc<CountingKeepAlive>,
}

impl Harness {
    fn new(names: &[&str]) -> Self {
        Self::with_store(names, Arc::new(MemoryStore::new()))
    }

    fn with_store(names: &[&str], store: Arc<MemoryStore>) -> Self {
        let decoder = Arc::new(ScriptedDecoder::new());
        let sink = Arc::new(RecordingSink::default());
        let keep_alive = Arc::new(CountingKeepAlive::default());
        let (tx, rx) = crossbeam_channel::unbounded();

        let lookup = StaticLookup(
            ["x", "y"]
                .iter()
                .map(|n| (loc(n), track(n)))
                .collect(),
        );
        let collaborators = Collaborators::new(decoder.clone())
            .with_store(store.clone())
            .with_sink(sink.clone())
            .with_keep_alive(keep_alive.clone())
            .with_lookup(Arc::new(lookup));
        let config = EngineConfig {
            random_seed: Some(42),
            ..EngineConfig::default()
        };

        let mut harness = Self {
            orchestrator: Orchestrator::new(config, collaborators, SignalSender::from_channel(tx)),
            decoder,
            rx,
            sink,
            store,
            keep_alive,
        };
        if !names.is_empty() {
            harness.run(Command::Enqueue(tracks(names))).unwrap();
        }
        harness
    }

    fn pump(&mut self) {
        while let Ok(signal) = self.rx.try_recv() {
            self.orchestrator.on_decoder_signal(signal);
        }
    }

    fn run(&mut self, command: Command) -> Result<(), PlaybackError> {
        let result = self.orchestrator.execute(command);
        self.pump();
        result
    }

    fn prepared(&mut self, name: &str) {
        assert!(self.decoder.prepared(&loc(name)), "{name} is not bound");
        self.pump();
    }

    fn completed(&mut self, name: &str) {
        assert!(self.decoder.completed(&loc(name)), "{name} is not bound");
        self.pump();
    }

    fn failed(&mut self, name: &str, error: SourceError) {
        assert!(self.decoder.failed(&loc(name), error), "{name} is not bound");
        self.pump();
    }

    /// Finish preparing whatever is bound to the active slot
    ///
    /// Needed when the standby holds another instance of the same locator.
    fn prepare_active(&mut self) {
        let handle = self
            .orchestrator
            .controller()
            .slot(SlotRole::Active)
            .map(|slot| slot.handle())
            .expect("active slot is bound");
        self.decoder.signal(DecoderSignal::Prepared(handle));
        self.pump();
    }

    /// Play from the current resume point and let the first track start
    fn start_playing(&mut self, name: &str) {
        self.run(Command::Play).unwrap();
        self.prepared(name);
        assert_eq!(self.orchestrator.state(), PlayerState::Playing);
    }

    fn standby(&self) -> Option<String> {
        self.orchestrator
            .controller()
            .standby_source()
            .map(str::to_string)
    }

    fn active(&self) -> Option<String> {
        self.orchestrator
            .controller()
            .active_source()
            .map(str::to_string)
    }

    fn current(&self) -> Option<usize> {
        self.orchestrator.current_index()
    }

    fn next(&self) -> Option<usize> {
        self.orchestrator.next_index()
    }
}

// ============================================================================
// SEQUENTIAL PLAYBACK
// ============================================================================

#[test]
fn sequential_completions_visit_every_index_once_then_stop() {
    let mut h = Harness::new(&["a", "b", "c"]);
    h.start_playing("a");

    let mut visited = vec![h.current()];
    for (playing, following) in [("a", "b"), ("b", "c")] {
        assert_eq!(h.standby(), Some(loc(following)));
        h.prepared(following);
        h.completed(playing);
        visited.push(h.current());
    }
    assert_eq!(visited, vec![Some(0), Some(1), Some(2)]);
    assert_eq!(h.next(), None);
    assert_eq!(h.standby(), None);

    h.completed("c");
    assert_eq!(h.orchestrator.state(), PlayerState::Empty);
    assert_eq!(h.current(), None);
    assert_eq!(h.decoder.live_count(), 0);
}

#[test]
fn gapless_handoff_promotes_prepared_standby() {
    let mut h = Harness::new(&[]);
    h.run(Command::Enqueue(vec![
        Track::new("A", loc("a")).with_duration_ms(180_000),
        Track::new("B", loc("b")).with_duration_ms(200_000),
    ]))
    .unwrap();
    h.start_playing("a");
    h.prepared("b");

    h.decoder.take_calls();
    h.completed("a");

    assert_eq!(h.current(), Some(1));
    assert_eq!(h.next(), None);
    assert_eq!(h.orchestrator.last_index(), Some(0));
    // The prepared instance is started, nothing is bound or prepared again
    let calls = h.decoder.take_calls();
    assert!(calls.contains(&DecoderCall::Start(loc("b"))));
    assert!(!calls.contains(&DecoderCall::Bind(loc("b"))));
    assert!(!calls.contains(&DecoderCall::Prepare(loc("b"))));
}

#[test]
fn finish_without_prepared_successor_starts_next_on_demand() {
    let mut h = Harness::new(&["a", "b"]);
    h.start_playing("a");
    assert_eq!(h.standby(), Some(loc("b")));

    // Standby never finished preparing
    h.completed("a");
    assert_eq!(h.orchestrator.state(), PlayerState::Preparing);
    assert_eq!(h.active(), Some(loc("b")));

    h.prepared("b");
    assert_eq!(h.current(), Some(1));
    assert_eq!(h.orchestrator.last_index(), Some(0));
}

// ============================================================================
// REPEAT AND RANDOM
// ============================================================================

#[test]
fn repeat_all_arms_first_track_after_last_starts() {
    let mut h = Harness::new(&["a", "b"]);
    h.run(Command::SetRepeat(RepeatMode::All)).unwrap();
    h.start_playing("a");
    h.prepared("b");
    h.completed("a");

    assert_eq!(h.current(), Some(1));
    assert_eq!(h.next(), Some(0));
    assert_eq!(h.standby(), Some(loc("a")));

    h.prepared("a");
    h.completed("b");
    assert_eq!(h.current(), Some(0));
}

#[test]
fn repeat_track_loops_but_explicit_skip_advances() {
    let mut h = Harness::new(&["a", "b", "c"]);
    h.start_playing("a");
    h.run(Command::SetRepeat(RepeatMode::Track)).unwrap();
    assert_eq!(h.next(), Some(0));
    assert_eq!(h.standby(), Some(loc("a")));

    h.run(Command::Next).unwrap();
    assert_eq!(h.active(), Some(loc("b")));
    h.prepare_active();
    assert_eq!(h.current(), Some(1));
    assert_eq!(h.next(), Some(1));
    assert_eq!(h.standby(), Some(loc("b")));
}

#[test]
fn random_next_differs_and_previous_returns_to_last() {
    let mut h = Harness::new(&["a", "b", "c", "d", "e"]);
    h.run(Command::SetRandom(true)).unwrap();
    h.start_playing("a");

    let next = h.next().expect("random draw");
    assert_ne!(next, 0);
    let name = ["a", "b", "c", "d", "e"][next];
    h.prepared(name);
    h.completed("a");
    assert_eq!(h.current(), Some(next));
    assert_eq!(h.orchestrator.last_index(), Some(0));

    h.run(Command::Previous).unwrap();
    h.prepare_active();
    assert_eq!(h.current(), Some(0));
    assert_eq!(h.orchestrator.last_index(), Some(next));
}

#[test]
fn mode_changes_rearm_standby() {
    let mut h = Harness::new(&["a", "b"]);
    h.run(Command::JumpTo(1)).unwrap();
    h.prepared("b");
    assert_eq!(h.standby(), None);

    h.run(Command::SetRepeat(RepeatMode::All)).unwrap();
    assert_eq!(h.next(), Some(0));
    assert_eq!(h.standby(), Some(loc("a")));

    h.run(Command::SetRepeat(RepeatMode::Off)).unwrap();
    assert_eq!(h.next(), None);
    assert_eq!(h.standby(), None);

    h.run(Command::SetRandom(true)).unwrap();
    assert_eq!(h.next(), Some(0));
    h.run(Command::SetRandom(false)).unwrap();
    assert_eq!(h.next(), None);
}

// ============================================================================
// PLAYLIST EDITS
// ============================================================================

#[test]
fn enqueue_right_after_current_rearms_standby() {
    let mut h = Harness::new(&["a", "b"]);
    h.start_playing("a");
    assert_eq!(h.standby(), Some(loc("b")));

    h.run(Command::EnqueueNext(track("x"))).unwrap();
    assert_eq!(h.next(), Some(1));
    assert_eq!(h.standby(), Some(loc("x")));
    assert_eq!(h.orchestrator.playlist()[2].locator, loc("b"));
}

#[test]
fn append_after_last_track_arms_it() {
    let mut h = Harness::new(&["a"]);
    h.start_playing("a");
    assert_eq!(h.standby(), None);

    h.run(Command::Enqueue(tracks(&["b"]))).unwrap();
    assert_eq!(h.next(), Some(1));
    assert_eq!(h.standby(), Some(loc("b")));
}

#[test]
fn insert_elsewhere_only_shifts_indices() {
    let mut h = Harness::new(&["a", "b", "c"]);
    h.run(Command::JumpTo(1)).unwrap();
    h.prepared("b");
    h.prepared("c");
    h.decoder.take_calls();

    h.run(Command::Enqueue(tracks(&["d"]))).unwrap();
    assert_eq!(h.current(), Some(1));
    assert_eq!(h.next(), Some(2));
    assert!(h.decoder.take_calls().is_empty());
}

#[test]
fn removing_current_starts_the_track_that_slides_in() {
    let mut h = Harness::new(&["a", "b", "c"]);
    h.run(Command::JumpTo(1)).unwrap();
    h.prepared("b");

    h.run(Command::Dequeue(1)).unwrap();
    assert!(!h.decoder.is_live(&loc("b")));
    assert_eq!(h.active(), Some(loc("c")));

    // No gap in the playing state while the replacement prepares
    h.orchestrator.publish();
    let now_playing = h.sink.published().pop().unwrap();
    assert_eq!(h.orchestrator.state(), PlayerState::Preparing);
    assert!(now_playing.is_playing);
    assert_eq!(now_playing.track.map(|t| t.locator), Some(loc("c")));

    h.prepared("c");
    assert_eq!(h.current(), Some(1));
    assert_eq!(h.orchestrator.playlist().len(), 2);
}

#[test]
fn removing_last_playing_track_empties() {
    let mut h = Harness::new(&["a", "b"]);
    h.run(Command::JumpTo(1)).unwrap();
    h.prepared("b");

    h.run(Command::Dequeue(1)).unwrap();
    assert_eq!(h.orchestrator.state(), PlayerState::Empty);
    assert_eq!(h.current(), None);
    assert_eq!(h.decoder.live_count(), 0);
}

#[test]
fn removing_armed_next_rearms() {
    let mut h = Harness::new(&["a", "b", "c"]);
    h.start_playing("a");

    h.run(Command::Dequeue(1)).unwrap();
    assert_eq!(h.next(), Some(1));
    assert_eq!(h.standby(), Some(loc("c")));
}

#[test]
fn removing_only_successor_clears_standby() {
    let mut h = Harness::new(&["a", "b"]);
    h.start_playing("a");
    assert_eq!(h.standby(), Some(loc("b")));

    h.run(Command::Dequeue(1)).unwrap();
    assert_eq!(h.next(), None);
    assert_eq!(h.standby(), None);
    assert!(!h.decoder.is_live(&loc("b")));
}

#[test]
fn removing_before_current_shifts_without_decoder_calls() {
    let mut h = Harness::new(&["a", "b", "c", "d"]);
    h.run(Command::JumpTo(2)).unwrap();
    h.prepared("c");
    h.decoder.take_calls();

    h.run(Command::Dequeue(0)).unwrap();
    assert_eq!(h.current(), Some(1));
    assert_eq!(h.next(), Some(2));
    assert!(h.decoder.take_calls().is_empty());
    assert_eq!(h.current_track_locator(), Some(loc("c")));
}

#[test]
fn dequeue_out_of_range_is_rejected() {
    let mut h = Harness::new(&["a"]);
    assert!(matches!(
        h.run(Command::Dequeue(3)),
        Err(PlaybackError::IndexOutOfBounds { index: 3, len: 1 })
    ));
}

#[test]
fn clear_stops_and_empties() {
    let mut h = Harness::new(&["a", "b"]);
    h.start_playing("a");

    h.run(Command::Clear).unwrap();
    assert_eq!(h.orchestrator.state(), PlayerState::Empty);
    assert!(h.orchestrator.playlist().is_empty());
    assert_eq!(h.decoder.live_count(), 0);
}

#[test]
fn shuffle_moves_current_to_front_and_rearms() {
    let names = ["a", "b", "c", "d", "e", "f"];
    let mut h = Harness::new(&names);
    h.run(Command::JumpTo(3)).unwrap();
    h.prepared("d");

    h.run(Command::Shuffle).unwrap();
    assert_eq!(h.current(), Some(0));
    assert_eq!(h.current_track_locator(), Some(loc("d")));
    assert_eq!(h.next(), Some(1));
    let second = h.orchestrator.playlist()[1].locator.clone();
    assert_eq!(h.standby(), Some(second));
    assert_eq!(h.orchestrator.playlist().len(), names.len());
}

#[test]
fn locator_enqueue_skips_unindexed_locators() {
    let mut h = Harness::new(&[]);
    h.run(Command::EnqueueLocators(vec![
        loc("x"),
        "/music/unknown.flac".to_string(),
        loc("y"),
    ]))
    .unwrap();

    let locators: Vec<_> = h
        .orchestrator
        .playlist()
        .iter()
        .map(|t| t.locator.clone())
        .collect();
    assert_eq!(locators, vec![loc("x"), loc("y")]);
}

#[test]
fn play_all_replaces_playlist_and_starts_at_index() {
    let mut h = Harness::new(&["a", "b"]);
    h.start_playing("a");

    h.run(Command::PlayAll {
        tracks: tracks(&["x", "y"]),
        start_index: 1,
    })
    .unwrap();
    assert!(!h.decoder.is_live(&loc("a")));
    h.prepared("y");
    assert_eq!(h.current(), Some(1));
    assert_eq!(h.orchestrator.playlist().len(), 2);
}

// ============================================================================
// TRANSPORT
// ============================================================================

#[test]
fn stop_twice_is_the_same_as_once() {
    let mut h = Harness::new(&["a", "b"]);
    h.start_playing("a");

    h.run(Command::Stop).unwrap();
    let after_first = (h.orchestrator.state(), *h.orchestrator.indices());
    h.run(Command::Stop).unwrap();

    assert_eq!((h.orchestrator.state(), *h.orchestrator.indices()), after_first);
    assert_eq!(h.orchestrator.state(), PlayerState::Stopped);
    assert_eq!(h.current(), None);
    assert_eq!(h.active(), None);
    assert_eq!(h.standby(), None);
    assert_eq!(h.decoder.live_count(), 0);
}

#[test]
fn stop_persists_and_play_resumes_at_position() {
    let mut h = Harness::new(&["a", "b"]);
    h.run(Command::JumpTo(1)).unwrap();
    h.prepared("b");
    h.decoder.set_position(&loc("b"), Duration::from_secs(30));

    h.run(Command::Stop).unwrap();
    let saved = h.store.load_last_state().unwrap();
    assert_eq!(saved.index, Some(1));
    assert_eq!(saved.position_ms, 30_000);
    assert_eq!(h.store.load_playlist().unwrap().len(), 2);

    h.run(Command::TogglePause).unwrap();
    h.prepared("b");
    assert_eq!(h.current(), Some(1));
    assert!(h
        .decoder
        .calls()
        .contains(&DecoderCall::Seek(loc("b"), Duration::from_secs(30))));
}

#[test]
fn restores_playlist_and_mode_from_store() {
    let store = Arc::new(MemoryStore::with_contents(
        tracks(&["a", "b", "c"]),
        LastState {
            index: Some(2),
            position_ms: 5_000,
            mode: PlaybackMode::new(false, RepeatMode::All),
        },
    ));
    let mut h = Harness::with_store(&[], store);
    assert_eq!(h.orchestrator.playlist().len(), 3);
    assert_eq!(h.orchestrator.mode().repeat, RepeatMode::All);

    h.start_playing("c");
    assert_eq!(h.current(), Some(2));
    assert_eq!(h.next(), Some(0));
}

#[test]
fn unreadable_store_starts_empty() {
    let store = Arc::new(MemoryStore::new());
    store.set_failing(true);
    let h = Harness::with_store(&[], store);
    assert!(h.orchestrator.playlist().is_empty());
    assert_eq!(h.orchestrator.state(), PlayerState::Empty);
}

#[test]
fn pause_toggle_and_resume() {
    let mut h = Harness::new(&["a"]);
    h.start_playing("a");

    h.run(Command::TogglePause).unwrap();
    assert_eq!(h.orchestrator.state(), PlayerState::Paused);
    assert!(!h.decoder.is_playing(&loc("a")));

    h.run(Command::Play).unwrap();
    assert_eq!(h.orchestrator.state(), PlayerState::Playing);
    assert!(h.decoder.is_playing(&loc("a")));
}

#[test]
fn pause_while_preparing_is_ignored() {
    let mut h = Harness::new(&["a"]);
    h.run(Command::Play).unwrap();
    assert!(h.run(Command::Pause).unwrap_err().is_ignorable());
    assert_eq!(h.orchestrator.state(), PlayerState::Preparing);
}

#[test]
fn seek_past_duration_is_ignored() {
    let mut h = Harness::new(&["a"]);
    h.start_playing("a");

    let err = h.run(Command::Seek(181_000)).unwrap_err();
    assert!(err.is_ignorable());
    h.run(Command::Seek(90_000)).unwrap();
    assert_eq!(h.decoder.position(&loc("a")), Some(Duration::from_secs(90)));
}

#[test]
fn previous_at_first_track_stops_without_repeat() {
    let mut h = Harness::new(&["a", "b"]);
    h.start_playing("a");

    h.run(Command::Previous).unwrap();
    assert_eq!(h.orchestrator.state(), PlayerState::Stopped);

    h.run(Command::SetRepeat(RepeatMode::All)).unwrap();
    h.start_playing("a");
    h.run(Command::Previous).unwrap();
    h.prepared("b");
    assert_eq!(h.current(), Some(1));
}

#[test]
fn next_past_end_stops() {
    let mut h = Harness::new(&["a"]);
    h.start_playing("a");
    h.run(Command::Next).unwrap();
    assert_eq!(h.orchestrator.state(), PlayerState::Stopped);
}

#[test]
fn volume_is_clamped() {
    let mut h = Harness::new(&["a"]);
    h.run(Command::SetVolume(2.0, 0.5)).unwrap();
    assert_eq!(h.orchestrator.snapshot().volume, (1.0, 0.5));
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn bind_failure_reports_and_stops_without_retry() {
    let mut h = Harness::new(&["a", "b"]);
    h.decoder.fail_bind(&loc("a"), SourceError::PermissionDenied);

    let err = h.run(Command::Play).unwrap_err();
    assert!(matches!(
        err,
        PlaybackError::Source(SourceError::PermissionDenied)
    ));
    assert_eq!(h.orchestrator.state(), PlayerState::Stopped);
    assert_eq!(h.sink.failures().len(), 1);
    assert_eq!(h.decoder.count(&DecoderCall::Bind(loc("a"))), 1);
    assert_eq!(h.decoder.count(&DecoderCall::Bind(loc("b"))), 0);
}

#[test]
fn preparation_failure_before_start_stops() {
    let mut h = Harness::new(&["a", "b"]);
    h.run(Command::Play).unwrap();
    h.failed("a", SourceError::IoFailure);

    assert_eq!(h.orchestrator.state(), PlayerState::Stopped);
    assert_eq!(h.sink.failures().len(), 1);
    assert_eq!(h.decoder.live_count(), 0);
    assert_eq!(h.orchestrator.last_state().index, Some(0));
}

#[test]
fn failure_mid_playback_advances() {
    let mut h = Harness::new(&["a", "b"]);
    h.start_playing("a");

    h.failed("a", SourceError::IoFailure);
    assert_eq!(h.active(), Some(loc("b")));
    h.prepared("b");
    assert_eq!(h.current(), Some(1));
    assert!(h.sink.failures().is_empty());
}

#[test]
fn standby_failure_keeps_current_track_playing() {
    let mut h = Harness::new(&["a", "b"]);
    h.start_playing("a");

    h.failed("b", SourceError::IoFailure);
    assert_eq!(h.orchestrator.state(), PlayerState::Playing);
    assert_eq!(h.standby(), None);
    assert_eq!(h.next(), Some(1));
}

#[test]
fn stale_signals_after_stop_are_dropped() {
    let mut h = Harness::new(&["a"]);
    h.run(Command::Play).unwrap();
    let handle = h.decoder.live_handle(&loc("a")).unwrap();
    h.run(Command::Stop).unwrap();

    h.decoder.signal(DecoderSignal::Prepared(handle));
    h.pump();
    assert_eq!(h.orchestrator.state(), PlayerState::Stopped);
    assert_eq!(h.current(), None);
}

// ============================================================================
// COLLABORATORS
// ============================================================================

#[test]
fn keep_alive_held_only_during_transitions() {
    let mut h = Harness::new(&["a", "b"]);
    h.run(Command::Play).unwrap();
    assert_eq!(h.keep_alive.0.load(Ordering::SeqCst), 1);

    h.prepared("a");
    assert_eq!(h.keep_alive.0.load(Ordering::SeqCst), 0);
    assert!(!h.orchestrator.keep_alive_held());

    h.run(Command::Next).unwrap();
    assert!(h.orchestrator.keep_alive_held());
    let deadline = h.orchestrator.keep_alive_deadline().unwrap();
    assert!(deadline <= Instant::now() + Duration::from_secs(5));
    assert!(h.orchestrator.expire_keep_alive(deadline));
    assert_eq!(h.keep_alive.0.load(Ordering::SeqCst), 0);
}

#[test]
fn publishes_only_when_now_playing_changes() {
    let mut h = Harness::new(&["a", "b"]);
    h.orchestrator.publish();
    h.orchestrator.publish();
    assert_eq!(h.sink.published().len(), 1);

    h.start_playing("a");
    h.orchestrator.publish();
    let published = h.sink.published();
    assert_eq!(published.len(), 2);
    assert!(published[1].is_playing);
    assert_eq!(published[1].track.as_ref().map(|t| t.locator.clone()), Some(loc("a")));
    assert_eq!(published[1].playlist_length, 2);
}

#[test]
fn skipping_reports_the_incoming_track_as_playing() {
    let mut h = Harness::new(&["a", "b"]);
    h.start_playing("a");

    h.run(Command::Next).unwrap();
    h.orchestrator.publish();
    let now_playing = h.sink.published().pop().unwrap();
    assert!(now_playing.is_playing);
    assert_eq!(now_playing.track.map(|t| t.locator), Some(loc("b")));
}

#[test]
fn first_start_is_not_reported_as_playing_until_prepared() {
    let mut h = Harness::new(&["a", "b"]);
    h.run(Command::Play).unwrap();
    h.orchestrator.publish();
    let now_playing = h.sink.published().pop().unwrap();
    assert!(!now_playing.is_playing);
    assert_eq!(now_playing.track.map(|t| t.locator), Some(loc("a")));
}

#[test]
fn save_writes_current_position() {
    let mut h = Harness::new(&["a"]);
    h.start_playing("a");
    h.decoder.set_position(&loc("a"), Duration::from_millis(1234));

    h.run(Command::Save).unwrap();
    assert_eq!(h.store.load_last_state().unwrap().position_ms, 1234);
    assert_eq!(h.orchestrator.state(), PlayerState::Playing);
}

impl Harness {
    fn current_track_locator(&self) -> Option<String> {
        self.orchestrator.current_track().map(|t| t.locator.clone())
    }
}
