//! Domain types for Segue

mod mode;
mod state;
mod track;

pub use mode::{PlaybackMode, RepeatMode};
pub use state::{LastState, NowPlaying};
pub use track::Track;
