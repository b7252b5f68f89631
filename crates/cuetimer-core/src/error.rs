//! Core error types for cuetimer-core.
//!
//! Cue playback failures never reach the engine; they are reported here so
//! emitters have something typed to return and the dispatcher has something
//! to log.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cuetimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cue playback errors
    #[error("Cue error: {0}")]
    Cue(#[from] CueError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The countdown runner task is gone and can no longer take commands
    #[error("Countdown runner has shut down")]
    RunnerClosed,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration at {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Errors raised by cue emitters.
#[derive(Error, Debug)]
pub enum CueError {
    /// The sound or speech backend rejected the request
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    /// No audio/speech backend could be reached
    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Completion sound id outside the catalog
    #[error("Unknown completion sound '{id}' (expected one of: {known})")]
    UnknownSound { id: String, known: String },

    /// Preset label outside the catalog
    #[error("Unknown preset '{label}' (expected one of: {known})")]
    UnknownPreset { label: String, known: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
