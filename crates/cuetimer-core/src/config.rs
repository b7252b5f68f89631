//! TOML-based application configuration.
//!
//! Holds the startup defaults for the timer:
//! - Countdown length
//! - Cue toggles and the completion sound
//! - Which external programs play sounds and speak numbers
//!
//! Read from `$CUETIMER_CONFIG` or `~/.config/cuetimer/config.toml`. The file
//! is only ever read; a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::timer::{CompletionSound, FeatureToggles, TimerConfiguration, DEFAULT_DURATION_SECS};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "CUETIMER_CONFIG";

/// Timer section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
}

/// Cue toggles section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuesConfig {
    #[serde(default = "default_true")]
    pub tick_sound: bool,
    #[serde(default = "default_true")]
    pub voice_countdown: bool,
    #[serde(default = "default_true")]
    pub auto_restart: bool,
    #[serde(default)]
    pub completion_sound: CompletionSound,
}

/// External audio programs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Speech command; the number is appended as the last argument.
    #[serde(default = "default_speech_command")]
    pub speech_command: String,
    /// Audio player; the sound file path is appended as the last argument.
    #[serde(default = "default_player_command")]
    pub player_command: String,
    /// Directory holding `wisle.mp3` and `sir-jade.mp3`.
    #[serde(default = "default_sounds_dir")]
    pub sounds_dir: PathBuf,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub cues: CuesConfig,
    #[serde(default)]
    pub audio: AudioConfig,
}

// Default functions
fn default_duration_secs() -> u64 {
    DEFAULT_DURATION_SECS
}
fn default_true() -> bool {
    true
}
fn default_speech_command() -> String {
    if cfg!(target_os = "macos") {
        "say".into()
    } else {
        "espeak".into()
    }
}
fn default_player_command() -> String {
    if cfg!(target_os = "macos") {
        "afplay".into()
    } else {
        "mpg123 -q".into()
    }
}
fn default_sounds_dir() -> PathBuf {
    config_dir().join("sounds")
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
        }
    }
}

impl Default for CuesConfig {
    fn default() -> Self {
        Self {
            tick_sound: true,
            voice_countdown: true,
            auto_restart: true,
            completion_sound: CompletionSound::default(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            speech_command: default_speech_command(),
            player_command: default_player_command(),
            sounds_dir: default_sounds_dir(),
        }
    }
}

/// Returns `~/.config/cuetimer[-dev]/` based on CUETIMER_ENV.
///
/// Set CUETIMER_ENV=dev to use the development directory. The directory is
/// not created.
pub fn config_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CUETIMER_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("cuetimer-dev")
    } else {
        base_dir.join("cuetimer")
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Config file location: `$CUETIMER_CONFIG` or the default directory.
    pub fn path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir().join("config.toml"))
    }

    /// Load from the default location, or return defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    /// Load from `path`, or return defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// including unknown completion sound ids.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ConfigError::ParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Result<String> {
        let json = serde_json::to_value(self)?;
        let val = Self::get_json_value_by_path(&json, key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        Ok(match val {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn timer_configuration(&self) -> TimerConfiguration {
        TimerConfiguration::new(self.timer.duration_secs)
    }

    pub fn toggles(&self) -> FeatureToggles {
        FeatureToggles {
            tick_sound: self.cues.tick_sound,
            voice_countdown: self.cues.voice_countdown,
            auto_restart: self.cues.auto_restart,
            completion_sound: self.cues.completion_sound,
        }
    }
}
