//! Configuration: MIDI client settings and playback tuning from ~/.korlessa/config.yaml.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dsl::context::DEFAULT_BPM;
use crate::player::{PlayerSettings, DEFAULT_DRAIN_SIZE, DEFAULT_QUEUE_SIZE};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings loaded from YAML. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub midi: MidiConfig,
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Name the MIDI client registers under.
    pub client_name: String,
    /// Port to connect to when none is given on the command line.
    pub target: Option<String>,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            client_name: "korlessa".to_string(),
            target: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub bpm: u32,
    pub queue_size: usize,
    pub drain_size: usize,
    pub poll_timeout_ms: u64,
    pub settle_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            queue_size: DEFAULT_QUEUE_SIZE,
            drain_size: DEFAULT_DRAIN_SIZE,
            poll_timeout_ms: 250,
            settle_ms: 1000,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".korlessa").join("config.yaml"))
}

impl Config {
    /// Load an explicit file, falling back to the default path, then to defaults.
    ///
    /// A missing default file is not an error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let player = &self.player;
        if player.bpm == 0 {
            return Err(ConfigError::Invalid("player.bpm must be positive".into()));
        }
        if player.drain_size == 0 {
            return Err(ConfigError::Invalid(
                "player.drain_size must be at least 1".into(),
            ));
        }
        if player.queue_size < player.drain_size {
            return Err(ConfigError::Invalid(format!(
                "player.queue_size ({}) must not be smaller than player.drain_size ({})",
                player.queue_size, player.drain_size
            )));
        }
        if self.midi.client_name.trim().is_empty() {
            return Err(ConfigError::Invalid("midi.client_name is empty".into()));
        }
        Ok(())
    }

    pub fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            bpm: self.player.bpm,
            queue_size: self.player.queue_size,
            drain_size: self.player.drain_size,
            poll_timeout: Duration::from_millis(self.player.poll_timeout_ms),
            settle: Duration::from_millis(self.player.settle_ms),
        }
    }
}
