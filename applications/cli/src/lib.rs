//! Segue CLI
//!
//! Headless harness around the playback engine: resolves tracks with lofty,
//! plays them on the simulated clock decoder and inspects the saved state.

pub mod commands;
pub mod config;
pub mod error;
pub mod sink;

pub use config::CliConfig;
pub use error::{CliError, Result};
