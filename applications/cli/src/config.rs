/// CLI configuration
use crate::error::{CliError, Result};
use segue_playback::EngineConfig;
use segue_transition::ClockSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file, read from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "segue.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_clock")]
    pub clock: ClockConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Directory holding `playlist.json` and `state.json`
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

/// Simulated decoder settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClockConfig {
    /// Playback speed multiplier (2.0 plays a 3 minute track in 90 seconds)
    #[serde(default = "default_speed")]
    pub speed: f64,

    #[serde(default = "default_prepare_latency_ms")]
    pub prepare_latency_ms: u64,

    /// Duration assumed for tracks without one
    #[serde(default = "default_track_duration_ms")]
    pub default_duration_ms: u64,

    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Refuse locators that do not exist on disk
    #[serde(default = "default_check_files")]
    pub check_files: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        default_storage()
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        default_clock()
    }
}

impl ClockConfig {
    pub fn settings(&self) -> ClockSettings {
        ClockSettings {
            speed: self.speed,
            prepare_latency: Duration::from_millis(self.prepare_latency_ms),
            default_duration: Duration::from_millis(self.default_duration_ms),
            tick: Duration::from_millis(self.tick_ms),
            check_files: self.check_files,
        }
    }
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// `path` overrides the default `segue.toml`; an explicitly named file must
    /// exist. Environment variables use the `SEGUE_` prefix with `__` between
    /// sections, e.g. `SEGUE_CLOCK__SPEED=4`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("SEGUE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.clock.speed.is_finite() || self.clock.speed <= 0.0 {
            return Err(CliError::Config(format!(
                "clock speed must be positive, got {}",
                self.clock.speed
            )));
        }

        if self.clock.speed > MAX_SPEED {
            return Err(CliError::Config(format!(
                "clock speed must be at most {}, got {}",
                MAX_SPEED, self.clock.speed
            )));
        }

        if self.clock.tick_ms == 0 {
            return Err(CliError::Config("clock tick must be at least 1ms".to_string()));
        }

        if !(0.0..=1.0).contains(&self.engine.initial_volume) {
            return Err(CliError::Config(format!(
                "initial volume must be within 0.0 - 1.0, got {}",
                self.engine.initial_volume
            )));
        }

        if self.storage.state_dir.as_os_str().is_empty() {
            return Err(CliError::Config("state directory is required".to_string()));
        }

        Ok(())
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        state_dir: default_state_dir(),
    }
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".segue")
}

fn default_clock() -> ClockConfig {
    ClockConfig {
        speed: default_speed(),
        prepare_latency_ms: default_prepare_latency_ms(),
        default_duration_ms: default_track_duration_ms(),
        tick_ms: default_tick_ms(),
        check_files: default_check_files(),
    }
}

/// Upper bound on the clock speed; larger values overflow media time
const MAX_SPEED: f64 = 1000.0;

fn default_speed() -> f64 {
    1.0
}

fn default_prepare_latency_ms() -> u64 {
    50
}

fn default_track_duration_ms() -> u64 {
    180_000
}

fn default_tick_ms() -> u64 {
    10
}

fn default_check_files() -> bool {
    true
}
