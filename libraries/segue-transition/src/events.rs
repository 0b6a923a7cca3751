//! Events reported by the transition controller
//!
//! Events are produced synchronously by the controller call that processed a
//! decoder signal, so their order is the order the caller handled signals in.

use crate::error::SourceError;

/// Transition controller event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    /// Playback of `source` became audible
    ///
    /// Emitted after an explicit `play` finished preparing, and on a gapless
    /// handoff to the standby slot.
    TrackStarted {
        /// Locator now playing
        source: String,
    },

    /// `source` ended and no prepared successor was available
    ///
    /// The controller is idle afterwards.
    TrackFinished {
        /// Locator that ended
        source: String,
    },

    /// The active decoder failed
    TrackFailed {
        /// Locator that failed
        source: String,
        /// Decoder-reported reason
        error: SourceError,
        /// Whether the track had started before failing
        started: bool,
    },
}

impl TransitionEvent {
    /// Locator the event refers to
    pub fn source(&self) -> &str {
        match self {
            Self::TrackStarted { source }
            | Self::TrackFinished { source }
            | Self::TrackFailed { source, .. } => source,
        }
    }
}
