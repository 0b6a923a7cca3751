//! Playback orchestrator - playlist truth and next-track policy
//!
//! The orchestrator is the only code that reads or writes playlist indices.
//! It is single-threaded: `PlaybackEngine` owns one on its worker thread and
//! feeds it commands and decoder signals in arrival order. Tests drive it
//! directly.

use crate::{
    command::Command,
    config::EngineConfig,
    error::{PlaybackError, Result},
    indices::Indices,
    keepalive::{KeepAlive, KeepAliveGuard, NoopKeepAlive},
    policy,
    shuffle::shuffle_around,
    types::{EngineSnapshot, PlayerState},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use segue_core::{
    LastState, MetadataLookup, NowPlaying, PlaybackMode, PlaylistStore, PresentationSink,
    RepeatMode, Track,
};
use segue_transition::{
    Decoder, DecoderSignal, SignalSender, SourceError, TransitionController, TransitionError,
    TransitionEvent,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// Platform collaborators of the orchestrator
pub struct Collaborators {
    pub decoder: Arc<dyn Decoder>,
    pub lookup: Option<Arc<dyn MetadataLookup>>,
    pub store: Option<Arc<dyn PlaylistStore>>,
    pub sink: Option<Arc<dyn PresentationSink>>,
    pub keep_alive: Arc<dyn KeepAlive>,
}

impl Collaborators {
    /// Collaborators with only a decoder; everything else is optional
    pub fn new(decoder: Arc<dyn Decoder>) -> Self {
        Self {
            decoder,
            lookup: None,
            store: None,
            sink: None,
            keep_alive: Arc::new(NoopKeepAlive),
        }
    }

    #[must_use]
    pub fn with_lookup(mut self, lookup: Arc<dyn MetadataLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn PlaylistStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn PresentationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: Arc<dyn KeepAlive>) -> Self {
        self.keep_alive = keep_alive;
        self
    }
}

/// Playlist owner and policy engine
pub struct Orchestrator {
    config: EngineConfig,

    // Playlist truth
    playlist: Arc<Vec<Track>>,
    indices: Indices,
    resume_position: Duration,
    mode: PlaybackMode,
    state: PlayerState,
    /// A restart begun while playing still counts as playing
    carry_playing: bool,

    // Decoder side
    controller: TransitionController,

    // Collaborators
    lookup: Option<Arc<dyn MetadataLookup>>,
    store: Option<Arc<dyn PlaylistStore>>,
    sink: Option<Arc<dyn PresentationSink>>,
    keep_alive: KeepAliveGuard,

    rng: StdRng,
    published: Option<NowPlaying>,
}

impl Orchestrator {
    /// Create an orchestrator; decoder signals must be routed back to
    /// `on_decoder_signal` through `signals`
    pub fn new(config: EngineConfig, collaborators: Collaborators, signals: SignalSender) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut controller = TransitionController::new(collaborators.decoder, signals);
        controller.set_volume(config.initial_volume, config.initial_volume);
        let keep_alive = KeepAliveGuard::new(collaborators.keep_alive, config.keep_alive_timeout());

        let mut orchestrator = Self {
            config,
            playlist: Arc::new(Vec::new()),
            indices: Indices::default(),
            resume_position: Duration::ZERO,
            mode: PlaybackMode::default(),
            state: PlayerState::Empty,
            carry_playing: false,
            controller,
            lookup: collaborators.lookup,
            store: collaborators.store,
            sink: collaborators.sink,
            keep_alive,
            rng,
            published: None,
        };

        if orchestrator.config.restore_on_start {
            orchestrator.restore();
        }
        orchestrator
    }

    /// Process one command, logging instead of returning failures
    pub fn handle(&mut self, command: Command) {
        let name = command.name();
        trace!(command = name, "processing command");

        match self.execute(command) {
            Ok(()) => {}
            Err(err) if err.is_ignorable() => debug!(command = name, %err, "command ignored"),
            // Already logged and reported to the sink
            Err(PlaybackError::Source(_)) => {}
            Err(err) => warn!(command = name, %err, "command failed"),
        }
    }

    /// Process one command
    pub fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Play => self.play(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::TogglePause => self.toggle_pause(),
            Command::Stop => self.stop(),
            Command::Next => self.next(),
            Command::Previous => self.previous(),
            Command::Seek(ms) => self.seek(Duration::from_millis(ms)),
            Command::JumpTo(index) => self.jump_to(index),
            Command::Enqueue(tracks) => {
                self.insert(self.playlist.len(), tracks);
                Ok(())
            }
            Command::EnqueueNext(track) => {
                let at = self
                    .indices
                    .anchor()
                    .map_or(self.playlist.len(), |anchor| anchor + 1);
                self.insert(at, vec![track]);
                Ok(())
            }
            Command::EnqueueLocators(locators) => self.enqueue_locators(&locators),
            Command::Dequeue(index) => self.dequeue(index),
            Command::Clear => {
                self.clear();
                Ok(())
            }
            Command::Shuffle => {
                self.shuffle();
                Ok(())
            }
            Command::SetRandom(random) => {
                self.set_mode(self.mode.with_random(random));
                Ok(())
            }
            Command::SetRepeat(repeat) => {
                self.set_mode(self.mode.with_repeat(repeat));
                Ok(())
            }
            Command::SetVolume(left, right) => {
                self.controller.set_volume(left, right);
                Ok(())
            }
            Command::Save => self.persist(),
            Command::PlayAll {
                tracks,
                start_index,
            } => self.play_all(tracks, start_index),
        }
    }

    /// Feed one decoder signal through the transition controller
    pub fn on_decoder_signal(&mut self, signal: DecoderSignal) {
        for event in self.controller.on_signal(signal) {
            let result = match event {
                TransitionEvent::TrackStarted { source } => {
                    self.track_started(&source);
                    Ok(())
                }
                TransitionEvent::TrackFinished { source } => self.track_finished(&source),
                TransitionEvent::TrackFailed {
                    source,
                    error,
                    started,
                } => self.track_failed(&source, error, started),
            };
            match result {
                Ok(()) | Err(PlaybackError::Source(_)) => {}
                Err(err) => warn!(%err, "failed to handle transition"),
            }
        }
    }

    // ===== Transport =====

    fn play(&mut self) -> Result<()> {
        match self.state {
            PlayerState::Paused => self.resume(),
            PlayerState::Playing | PlayerState::Preparing => Ok(()),
            PlayerState::Empty | PlayerState::Stopped => {
                if self.playlist.is_empty() {
                    return Err(PlaybackError::IllegalCommand("playlist is empty".into()));
                }
                match self.indices.resume.filter(|&i| i < self.playlist.len()) {
                    Some(index) => self.start_at(index, self.resume_position),
                    None => self.start_at(0, Duration::ZERO),
                }
            }
        }
    }

    fn pause(&mut self) -> Result<()> {
        if !self.controller.pause() {
            return Err(PlaybackError::IllegalCommand("nothing is playing".into()));
        }
        self.state = PlayerState::Paused;
        debug!("playback paused");
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if !self.controller.resume() {
            return Err(PlaybackError::IllegalCommand("nothing is paused".into()));
        }
        self.state = PlayerState::Playing;
        debug!("playback resumed");
        Ok(())
    }

    fn toggle_pause(&mut self) -> Result<()> {
        match self.state {
            PlayerState::Playing => self.pause(),
            PlayerState::Paused => self.resume(),
            PlayerState::Empty | PlayerState::Stopped => self.play(),
            PlayerState::Preparing => Err(PlaybackError::IllegalCommand(
                "track is still preparing".into(),
            )),
        }
    }

    /// Stop playback and remember where to resume
    ///
    /// Calling it twice is the same as calling it once.
    fn stop(&mut self) -> Result<()> {
        if let Some(index) = self.indices.anchor() {
            self.indices.resume = Some(index);
            self.resume_position = self.controller.position();
        }
        self.teardown(PlayerState::Stopped);
        info!(resume = ?self.indices.resume, "playback stopped");

        if self.config.persist_on_stop {
            self.persist()?;
        }
        Ok(())
    }

    fn next(&mut self) -> Result<()> {
        let Some(anchor) = self.indices.anchor() else {
            return Err(PlaybackError::IllegalCommand("nothing is playing".into()));
        };

        match self.advance_target(anchor) {
            Some(index) => self.start_at(index, Duration::ZERO),
            None => {
                debug!("skipped past the end of the playlist");
                self.stop()
            }
        }
    }

    fn previous(&mut self) -> Result<()> {
        let Some(anchor) = self.indices.anchor() else {
            return Err(PlaybackError::IllegalCommand("nothing is playing".into()));
        };

        match policy::previous_index(anchor, self.indices.last, self.playlist.len(), self.mode) {
            Some(index) => self.start_at(index, Duration::ZERO),
            None => {
                debug!("stepped back past the start of the playlist");
                self.stop()
            }
        }
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        if !matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
            return Err(PlaybackError::IllegalCommand("nothing to seek".into()));
        }
        if let Some(duration) = self.current_track().and_then(Track::duration) {
            if position > duration {
                return Err(PlaybackError::IllegalCommand(format!(
                    "seek to {}ms past end of track ({}ms)",
                    position.as_millis(),
                    duration.as_millis()
                )));
            }
        }
        if !self.controller.seek(position) {
            return Err(PlaybackError::IllegalCommand("seek rejected by decoder".into()));
        }
        Ok(())
    }

    fn jump_to(&mut self, index: usize) -> Result<()> {
        if index >= self.playlist.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.playlist.len(),
            });
        }
        self.start_at(index, Duration::ZERO)
    }

    fn play_all(&mut self, tracks: Vec<Track>, start_index: usize) -> Result<()> {
        self.teardown(PlayerState::Empty);
        self.playlist = Arc::new(tracks);
        self.indices = Indices::default();
        self.resume_position = Duration::ZERO;
        info!(tracks = self.playlist.len(), start_index, "playlist replaced");

        if self.playlist.is_empty() {
            return Ok(());
        }
        self.jump_to(start_index)
    }

    // ===== Playlist edits =====

    fn insert(&mut self, at: usize, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }
        let count = tracks.len();
        let at = at.min(self.playlist.len());

        Arc::make_mut(&mut self.playlist).splice(at..at, tracks);
        self.indices.shift_for_insert(at, count);
        debug!(at, count, len = self.playlist.len(), "tracks inserted");

        self.reconcile_next();
    }

    fn enqueue_locators(&mut self, locators: &[String]) -> Result<()> {
        let Some(lookup) = self.lookup.clone() else {
            return Err(PlaybackError::IllegalCommand(
                "no metadata lookup configured".into(),
            ));
        };

        let mut tracks = Vec::with_capacity(locators.len());
        for locator in locators {
            match lookup.resolve(locator) {
                Ok(track) => tracks.push(track),
                Err(err) if err.is_not_found() => {
                    warn!(locator = %locator, "locator is not indexed, skipping");
                }
                Err(err) => warn!(locator = %locator, %err, "metadata lookup failed, skipping"),
            }
        }

        self.insert(self.playlist.len(), tracks);
        Ok(())
    }

    fn dequeue(&mut self, index: usize) -> Result<()> {
        if index >= self.playlist.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.playlist.len(),
            });
        }

        let removing_anchor = self.indices.anchor() == Some(index);
        let removed = Arc::make_mut(&mut self.playlist).remove(index);
        self.indices.shift_for_remove(index);
        debug!(index, title = %removed.title, "track removed");

        if !removing_anchor {
            self.reconcile_next();
            return Ok(());
        }

        // The playing track is gone; whatever slid into its place plays next
        self.controller.stop();
        self.indices.current = None;
        self.indices.pending = None;
        self.indices.next = None;

        if index < self.playlist.len() {
            self.start_at(index, Duration::ZERO)
        } else {
            info!("removed the last track while it was playing");
            self.teardown(PlayerState::Empty);
            Ok(())
        }
    }

    fn clear(&mut self) {
        self.teardown(PlayerState::Empty);
        self.playlist = Arc::new(Vec::new());
        self.indices = Indices::default();
        self.resume_position = Duration::ZERO;
        info!("playlist cleared");
    }

    fn shuffle(&mut self) {
        if self.playlist.len() < 2 {
            return;
        }

        let preparing = self.indices.pending.is_some();
        let front = shuffle_around(
            Arc::make_mut(&mut self.playlist),
            self.indices.anchor(),
            &mut self.rng,
        );

        self.indices = Indices {
            current: front.filter(|_| !preparing),
            pending: front.filter(|_| preparing),
            ..Indices::default()
        };
        if let Some(anchor) = front {
            self.indices.next =
                policy::next_index(anchor, self.playlist.len(), self.mode, &mut self.rng);
        }
        self.arm_standby();
        info!(len = self.playlist.len(), "playlist shuffled");
    }

    fn set_mode(&mut self, mode: PlaybackMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        info!(random = mode.random, repeat = %mode.repeat, "playback mode changed");

        let Some(anchor) = self.indices.anchor() else {
            return;
        };
        let derived = policy::next_index(anchor, self.playlist.len(), self.mode, &mut self.rng);
        if derived != self.indices.next {
            self.indices.next = derived;
            self.arm_standby();
        }
    }

    // ===== Transition handling =====

    fn track_started(&mut self, source: &str) {
        match self.indices.pending.take() {
            Some(index) => {
                // Explicit jump; `next` was derived when the jump was issued
                self.indices.last = self.indices.current;
                self.indices.current = Some(index);
            }
            None => {
                // Gapless handoff to the armed standby
                self.indices.last = self.indices.current;
                self.indices.current = self.indices.next;
                self.indices.next = self.indices.current.and_then(|current| {
                    policy::next_index(current, self.playlist.len(), self.mode, &mut self.rng)
                });
                self.arm_standby();
            }
        }

        if self.current_track().map(|t| t.locator.as_str()) != Some(source) {
            warn!(source, current = ?self.indices.current, "started source does not match current index");
        }

        self.indices.resume = None;
        self.resume_position = Duration::ZERO;
        self.state = PlayerState::Playing;
        self.keep_alive.release();
        info!(
            index = ?self.indices.current,
            next = ?self.indices.next,
            source,
            "now playing"
        );
    }

    fn track_finished(&mut self, source: &str) -> Result<()> {
        match self.indices.next.filter(|&i| i < self.playlist.len()) {
            Some(next) => {
                debug!(source, next, "no prepared successor, starting next track");
                self.start_at(next, Duration::ZERO)
            }
            None => {
                info!(source, "playlist finished");
                self.teardown(PlayerState::Empty);
                Ok(())
            }
        }
    }

    fn track_failed(&mut self, source: &str, error: SourceError, started: bool) -> Result<()> {
        let anchor = self.indices.anchor();

        if !started {
            let title = anchor
                .and_then(|i| self.playlist.get(i))
                .map_or_else(|| source.to_string(), |t| t.title.clone());
            self.fail_start(anchor, &title, &PlaybackError::Source(error));
            return Ok(());
        }

        warn!(source, %error, "track failed during playback, advancing");
        match anchor.and_then(|anchor| self.advance_target(anchor)) {
            Some(next) => self.start_at(next, Duration::ZERO),
            None => {
                self.teardown(PlayerState::Empty);
                Ok(())
            }
        }
    }

    // ===== Helpers =====

    /// Bind the track at `index` and arm its successor
    fn start_at(&mut self, index: usize, offset: Duration) -> Result<()> {
        let Some(track) = self.playlist.get(index).cloned() else {
            return Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.playlist.len(),
            });
        };

        self.keep_alive.acquire(Instant::now());
        if let Err(err) = self.controller.play(&track.locator, offset) {
            let err = PlaybackError::from(err);
            self.fail_start(Some(index), &track.title, &err);
            return Err(err);
        }

        debug!(index, title = %track.title, offset_ms = offset.as_millis() as u64, "starting track");
        self.indices.pending = Some(index);
        self.carry_playing = match self.state {
            PlayerState::Playing => true,
            PlayerState::Preparing => self.carry_playing,
            _ => false,
        };
        self.state = PlayerState::Preparing;
        self.indices.next = policy::next_index(index, self.playlist.len(), self.mode, &mut self.rng);
        self.arm_standby();
        Ok(())
    }

    /// Start failure: report it and stop; no retry
    fn fail_start(&mut self, index: Option<usize>, title: &str, err: &PlaybackError) {
        error!(index = ?index, title, %err, "failed to start track");
        if let Some(sink) = &self.sink {
            sink.report_failure(&format!("Cannot play \"{title}\": {err}"));
        }
        self.teardown(PlayerState::Stopped);
        self.indices.resume = index;
        self.resume_position = Duration::ZERO;
    }

    /// Target of a skip (or of advancing past a broken track)
    fn advance_target(&mut self, anchor: usize) -> Option<usize> {
        let len = self.playlist.len();
        match self.mode.repeat {
            RepeatMode::Track => policy::skip_index(anchor, len, self.mode, &mut self.rng),
            _ => self.indices.next.filter(|&i| i < len),
        }
    }

    /// Re-derive `next` after a playlist edit and re-arm standby if it moved
    fn reconcile_next(&mut self) {
        let Some(anchor) = self.indices.anchor() else {
            self.indices.next = None;
            return;
        };
        // A random draw stays valid while its track is still in the playlist
        if self.mode.random
            && self.indices.next.is_some_and(|next| next != anchor)
            && self.standby_matches()
        {
            return;
        }

        let derived = policy::next_index(anchor, self.playlist.len(), self.mode, &mut self.rng);
        if derived != self.indices.next || !self.standby_matches() {
            self.indices.next = derived;
            self.arm_standby();
        }
    }

    /// Whether the standby slot holds the track at `next`
    fn standby_matches(&self) -> bool {
        if !self.controller.has_session() {
            return true;
        }
        let wanted = self
            .indices
            .next
            .and_then(|i| self.playlist.get(i))
            .map(|t| t.locator.as_str());
        self.controller.standby_source() == wanted
    }

    fn arm_standby(&mut self) {
        if !self.controller.has_session() {
            return;
        }
        let source = self
            .indices
            .next
            .and_then(|i| self.playlist.get(i))
            .map(|t| t.locator.clone());

        match self.controller.set_next(source.as_deref()) {
            Ok(()) => trace!(next = ?self.indices.next, "standby armed"),
            Err(TransitionError::Interrupted) => {
                warn!("standby arming interrupted, next track will not be pre-buffered");
            }
            Err(err) => warn!(next = ?self.indices.next, %err, "failed to arm next track"),
        }
    }

    fn teardown(&mut self, state: PlayerState) {
        self.controller.stop();
        self.indices.clear_playback();
        self.state = state;
        self.carry_playing = false;
        self.keep_alive.release();
    }

    fn restore(&mut self) {
        let Some(store) = self.store.clone() else {
            return;
        };

        let playlist = store.load_playlist().unwrap_or_else(|err| {
            warn!(%err, "failed to load playlist, starting empty");
            Vec::new()
        });
        let last = store.load_last_state().unwrap_or_else(|err| {
            warn!(%err, "failed to load last state");
            LastState::default()
        });

        self.playlist = Arc::new(playlist);
        self.mode = last.mode;
        self.indices = Indices {
            resume: last.index.filter(|&i| i < self.playlist.len()),
            ..Indices::default()
        };
        self.resume_position = Duration::from_millis(last.position_ms);
        info!(
            tracks = self.playlist.len(),
            resume = ?self.indices.resume,
            "restored playlist"
        );
    }

    // ===== Persistence and presentation =====

    /// Write playlist and last state to the store
    pub fn persist(&self) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        store.save_playlist(&self.playlist)?;
        store.save_last_state(&self.last_state())?;
        debug!(tracks = self.playlist.len(), "playlist and last state saved");
        Ok(())
    }

    /// Resume point as it would be persisted now
    pub fn last_state(&self) -> LastState {
        let (index, position) = match self.indices.anchor() {
            Some(index) => (Some(index), self.controller.position()),
            None => (self.indices.resume, self.resume_position),
        };
        LastState {
            index,
            position_ms: position.as_millis() as u64,
            mode: self.mode,
        }
    }

    pub fn now_playing(&self) -> NowPlaying {
        NowPlaying {
            track: self
                .indices
                .anchor()
                .and_then(|i| self.playlist.get(i))
                .cloned(),
            is_playing: match self.state {
                PlayerState::Playing => true,
                PlayerState::Preparing => self.carry_playing,
                _ => false,
            },
            mode: self.mode,
            playlist_length: self.playlist.len(),
        }
    }

    /// Push `NowPlaying` to the sink if it changed since the last push
    pub fn publish(&mut self) {
        let Some(sink) = &self.sink else {
            return;
        };
        let now_playing = self.now_playing();
        if self.published.as_ref() == Some(&now_playing) {
            return;
        }
        sink.publish(&now_playing);
        self.published = Some(now_playing);
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            state: self.state,
            current_index: self.indices.current,
            next_index: self.indices.next,
            last_index: self.indices.last,
            mode: self.mode,
            playlist: Arc::clone(&self.playlist),
            volume: self.controller.volume(),
        }
    }

    /// Persist and tear everything down
    pub fn shutdown(&mut self) {
        if let Err(err) = self.persist() {
            warn!(%err, "failed to persist state on shutdown");
        }
        self.controller.stop();
        self.keep_alive.release();
        info!("orchestrator shut down");
    }

    // ===== Keep-alive =====

    /// When the held keep-alive token expires
    pub fn keep_alive_deadline(&self) -> Option<Instant> {
        self.keep_alive.deadline()
    }

    /// Release the keep-alive token if it outlived its timeout
    pub fn expire_keep_alive(&mut self, now: Instant) -> bool {
        self.keep_alive.expire(now)
    }

    pub fn keep_alive_held(&self) -> bool {
        self.keep_alive.is_held()
    }

    // ===== Accessors =====

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn indices(&self) -> &Indices {
        &self.indices
    }

    pub fn current_index(&self) -> Option<usize> {
        self.indices.current
    }

    pub fn next_index(&self) -> Option<usize> {
        self.indices.next
    }

    pub fn last_index(&self) -> Option<usize> {
        self.indices.last
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.indices.current.and_then(|i| self.playlist.get(i))
    }

    /// Playback offset of the current track
    pub fn position(&self) -> Duration {
        if self.controller.has_session() {
            self.controller.position()
        } else {
            Duration::ZERO
        }
    }

    pub fn controller(&self) -> &TransitionController {
        &self.controller
    }
}
