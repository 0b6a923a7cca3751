//! Engine configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Longest a keep-alive token is held while a transition is pending (ms)
    #[serde(default = "default_keep_alive_timeout_ms")]
    pub keep_alive_timeout_ms: u64,

    /// How long synchronous queries (position, flush) wait for the worker (ms)
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Seed for random next-track draws and shuffles (entropy when unset)
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Volume applied to both channels at startup (0.0 - 1.0)
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    /// Write playlist and last state on every stop
    #[serde(default = "default_true")]
    pub persist_on_stop: bool,

    /// Load playlist and last state when the engine starts
    #[serde(default = "default_true")]
    pub restore_on_start: bool,
}

fn default_keep_alive_timeout_ms() -> u64 {
    5_000
}

fn default_query_timeout_ms() -> u64 {
    1_000
}

fn default_initial_volume() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout_ms: default_keep_alive_timeout_ms(),
            query_timeout_ms: default_query_timeout_ms(),
            random_seed: None,
            initial_volume: default_initial_volume(),
            persist_on_stop: true,
            restore_on_start: true,
        }
    }
}

impl EngineConfig {
    pub fn keep_alive_timeout(&self) -> Duration {
        Duration::from_millis(self.keep_alive_timeout_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}
