mod cue;
mod display;
mod engine;
mod settings;

pub use cue::{plan_cues, Cue, VOICE_COUNTDOWN_FROM};
pub use display::{format_clock, status_label};
pub use engine::{CountdownEngine, TimerPhase, TimerSnapshot};
pub use settings::{
    duration_from_parts, parse_duration_input, CompletionSound, FeatureToggles, Preset,
    TimerConfiguration, DEFAULT_DURATION_SECS, PRESETS,
};
