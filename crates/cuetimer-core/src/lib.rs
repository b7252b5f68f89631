//! # Cuetimer Core Library
//!
//! Countdown timer with audible cues. A duration is set, the countdown is
//! started/paused/reset, and on each second the engine decides whether to
//! play a tick, speak a final-countdown number, or announce completion,
//! optionally restarting after a short delay.
//!
//! ## Architecture
//!
//! - **Cue Policy**: pure per-tick decision, see [`plan_cues`]
//! - **Countdown Engine**: tick-driven state machine, see [`CountdownEngine`]
//! - **Runner**: tokio task owning the engine and its only tick timer,
//!   see [`runner::spawn`]
//! - **Cues**: emitter ports plus terminal/process-backed implementations
//! - **Config**: read-only TOML startup defaults
//!
//! The presentation layer (the CLI crate) only talks to
//! [`CountdownHandle`].

pub mod config;
pub mod cues;
pub mod error;
pub mod events;
pub mod runner;
pub mod timer;

pub use config::Config;
pub use cues::{
    CommandPlayer, CommandSpeaker, CompletionCueEmitter, CueDispatcher, Recording, Silent,
    SpokenNumberEmitter, TerminalBell, TickCueEmitter,
};
pub use error::{ConfigError, CoreError, CueError, ValidationError};
pub use events::Event;
pub use runner::{Command, CountdownHandle};
pub use timer::{
    format_clock, parse_duration_input, plan_cues, CompletionSound, CountdownEngine, Cue,
    FeatureToggles, Preset, TimerConfiguration, TimerPhase, TimerSnapshot, PRESETS,
};
