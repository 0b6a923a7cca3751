//! Segue Playback - playlist orchestration
//!
//! Owns the playlist, the current/next/last indices and the random/repeat
//! policy, and drives a `TransitionController` so consecutive tracks play
//! without gaps.
//!
//! This crate provides:
//! - Next-index derivation under random/repeat modes
//! - Playlist edits that keep indices valid (enqueue, enqueue-next, dequeue,
//!   clear, shuffle-in-place)
//! - Recovery from decoder failures mid-transition
//! - Resume point persistence through a `PlaylistStore`
//! - A single-threaded command worker (`PlaybackEngine`)
//!
//! # Architecture
//!
//! ```text
//!  callers ──Command──┐
//!                     ▼
//!              [ unbounded queue ] ──► worker thread: Orchestrator
//!                     ▲                        │
//!  decoder ──Signal───┘                        ▼
//!                                   TransitionController ──► Decoder
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use segue_core::{RepeatMode, Track};
//! use segue_playback::{Collaborators, EngineConfig, PlaybackEngine};
//! use segue_transition::{ClockDecoder, ClockSettings};
//! use std::sync::Arc;
//!
//! let decoder = Arc::new(ClockDecoder::new(ClockSettings::default())?);
//! let mut engine = PlaybackEngine::start(EngineConfig::default(), Collaborators::new(decoder))?;
//!
//! engine.enqueue(vec![
//!     Track::new("One", "/music/one.flac").with_duration_ms(180_000),
//!     Track::new("Two", "/music/two.flac").with_duration_ms(200_000),
//! ])?;
//! engine.set_repeat(RepeatMode::All)?;
//! engine.play()?;
//!
//! engine.flush()?;
//! println!("{:?}", engine.snapshot().state);
//! engine.shutdown()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod command;
mod config;
mod engine;
mod error;
mod indices;
mod keepalive;
mod orchestrator;
pub mod policy;
mod shuffle;
pub mod types;

// Public exports
pub use command::Command;
pub use config::EngineConfig;
pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use indices::Indices;
pub use keepalive::{KeepAlive, NoopKeepAlive};
pub use orchestrator::{Collaborators, Orchestrator};
pub use shuffle::shuffle_around;
pub use types::{EngineSnapshot, PlayerState};
