/// Playback mode types
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the playlist ends
    #[default]
    Off,

    /// Loop the entire playlist
    All,

    /// Loop the current track only
    Track,
}

impl RepeatMode {
    /// Next mode in the Off → All → Track → Off cycle
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::Track,
            Self::Track => Self::Off,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::All => "all",
            Self::Track => "track",
        };
        f.write_str(name)
    }
}

impl FromStr for RepeatMode {
    type Err = crate::SegueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "all" | "playlist" => Ok(Self::All),
            "track" | "one" | "single" => Ok(Self::Track),
            other => Err(crate::SegueError::invalid_input(format!(
                "unknown repeat mode '{other}'"
            ))),
        }
    }
}

/// Process-wide playback mode: random and repeat flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PlaybackMode {
    /// Random next-track selection
    #[serde(default)]
    pub random: bool,

    /// Repeat policy
    #[serde(default)]
    pub repeat: RepeatMode,
}

impl PlaybackMode {
    /// Create a mode from both flags
    pub fn new(random: bool, repeat: RepeatMode) -> Self {
        Self { random, repeat }
    }

    /// Return a copy with the random flag replaced
    #[must_use]
    pub fn with_random(self, random: bool) -> Self {
        Self { random, ..self }
    }

    /// Return a copy with the repeat mode replaced
    #[must_use]
    pub fn with_repeat(self, repeat: RepeatMode) -> Self {
        Self { repeat, ..self }
    }
}
