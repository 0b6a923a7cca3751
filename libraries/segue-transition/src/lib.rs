//! Segue Transition - two-slot gapless decoder handoff
//!
//! Keeps an audible `active` decoder and a pre-buffered `standby` decoder,
//! and promotes the standby instance the moment the active one reports its
//! natural end.
//!
//! # Architecture
//!
//! - **Decoder** - capability trait over the native player; asynchronous
//!   outcomes come back as [`DecoderSignal`]s through a [`SignalSender`]
//! - **TransitionController** - owns both slots and turns decoder signals
//!   into [`TransitionEvent`]s
//! - **ClockDecoder** - wall-clock simulation used by the CLI
//!
//! The controller takes `&mut self` everywhere; its owner serialises commands
//! and decoder signals on one thread.
//!
//! # Example
//!
//! ```no_run
//! use segue_transition::{ClockDecoder, ClockSettings, SignalSender, TransitionController};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let decoder = Arc::new(ClockDecoder::new(ClockSettings::default())?);
//! let (tx, rx) = crossbeam_channel::unbounded();
//! let mut controller = TransitionController::new(decoder, SignalSender::from_channel(tx));
//!
//! controller.play("/music/a.flac", Duration::ZERO)?;
//! controller.set_next(Some("/music/b.flac"))?;
//!
//! while let Ok(signal) = rx.recv() {
//!     for event in controller.on_signal(signal) {
//!         println!("{event:?}");
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod clock;
pub mod controller;
pub mod decoder;
pub mod error;
pub mod events;
pub mod slot;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clock::{ClockDecoder, ClockSettings};
pub use controller::{TransitionController, Transport};
pub use decoder::{Decoder, DecoderHandle, DecoderSignal, SignalSender};
pub use error::{Result, SourceError, TransitionError};
pub use events::TransitionEvent;
pub use slot::{Readiness, Slot, SlotRole};
