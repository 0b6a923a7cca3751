//! Playlist index bookkeeping
//!
//! Every index is either `None` or within `[0, len)` of the playlist it refers
//! to. Playlist edits go through `shift_for_insert` / `shift_for_remove` so the
//! indices keep pointing at the same tracks.

/// Indices into the playlist owned by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Indices {
    /// Track playing (or paused)
    pub current: Option<usize>,

    /// Track armed in the standby slot
    pub next: Option<usize>,

    /// Track played before `current`
    pub last: Option<usize>,

    /// Track requested by an explicit jump, becomes `current` once it starts
    pub pending: Option<usize>,

    /// Where `play` continues after a stop or restart
    pub resume: Option<usize>,
}

impl Indices {
    /// Index the next-track policy is anchored on
    ///
    /// A pending jump wins over the track still audible.
    pub fn anchor(&self) -> Option<usize> {
        self.pending.or(self.current)
    }

    /// Forget playback indices; the resume point is kept
    pub fn clear_playback(&mut self) {
        self.current = None;
        self.next = None;
        self.last = None;
        self.pending = None;
    }

    /// `count` tracks were inserted at `at`
    pub fn shift_for_insert(&mut self, at: usize, count: usize) {
        for index in self.all_mut() {
            if let Some(i) = index {
                if *i >= at {
                    *i += count;
                }
            }
        }
    }

    /// The track at `at` was removed; indices pointing at it become `None`
    pub fn shift_for_remove(&mut self, at: usize) {
        for index in self.all_mut() {
            *index = match *index {
                Some(i) if i == at => None,
                Some(i) if i > at => Some(i - 1),
                other => other,
            };
        }
    }

    /// Drop any index outside `[0, len)`
    pub fn clamp(&mut self, len: usize) {
        for index in self.all_mut() {
            if index.is_some_and(|i| i >= len) {
                *index = None;
            }
        }
    }

    /// Whether every index is `None` or below `len`
    pub fn is_valid_for(&self, len: usize) -> bool {
        [self.current, self.next, self.last, self.pending, self.resume]
            .into_iter()
            .flatten()
            .all(|i| i < len)
    }

    fn all_mut(&mut self) -> [&mut Option<usize>; 5] {
        [
            &mut self.current,
            &mut self.next,
            &mut self.last,
            &mut self.pending,
            &mut self.resume,
        ]
    }
}
