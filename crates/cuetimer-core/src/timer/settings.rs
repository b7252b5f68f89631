//! Timer configuration, feature toggles and the fixed catalogs the shell
//! picks from (completion sounds, presets).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default countdown length: five minutes.
pub const DEFAULT_DURATION_SECS: u64 = 300;

/// The configured countdown length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfiguration {
    pub duration_secs: u64,
}

impl TimerConfiguration {
    pub fn new(duration_secs: u64) -> Self {
        Self { duration_secs }
    }
}

impl Default for TimerConfiguration {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

/// Sound played when the countdown reaches zero.
///
/// `None` is the "no sound" sentinel: completion emitters must treat it as a
/// silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionSound {
    #[default]
    Wisle,
    SirJade,
    None,
}

impl CompletionSound {
    pub const ALL: [CompletionSound; 3] = [
        CompletionSound::Wisle,
        CompletionSound::SirJade,
        CompletionSound::None,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CompletionSound::Wisle => "wisle",
            CompletionSound::SirJade => "sir-jade",
            CompletionSound::None => "none",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CompletionSound::Wisle => "Wisle",
            CompletionSound::SirJade => "Sir Jade",
            CompletionSound::None => "No Sound",
        }
    }

    /// Asset file name relative to the sounds directory.
    pub fn asset_file(self) -> Option<&'static str> {
        match self {
            CompletionSound::Wisle => Some("wisle.mp3"),
            CompletionSound::SirJade => Some("sir-jade.mp3"),
            CompletionSound::None => None,
        }
    }

    pub fn is_silent(self) -> bool {
        self.asset_file().is_none()
    }

    fn known_ids() -> String {
        Self::ALL.iter().map(|s| s.id()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for CompletionSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CompletionSound {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|sound| sound.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownSound {
                id: wanted.to_string(),
                known: Self::known_ids(),
            })
    }
}

/// Independent cue switches. Read fresh on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureToggles {
    pub tick_sound: bool,
    pub voice_countdown: bool,
    pub auto_restart: bool,
    pub completion_sound: CompletionSound,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            tick_sound: true,
            voice_countdown: true,
            auto_restart: true,
            completion_sound: CompletionSound::default(),
        }
    }
}

/// A one-click duration from the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub label: &'static str,
    pub duration_secs: u64,
}

pub const PRESETS: [Preset; 4] = [
    Preset { label: "25s", duration_secs: 25 },
    Preset { label: "1m", duration_secs: 60 },
    Preset { label: "5m", duration_secs: 5 * 60 },
    Preset { label: "10m", duration_secs: 10 * 60 },
];

impl Preset {
    pub fn find(label: &str) -> Result<Preset, ValidationError> {
        let wanted = label.trim();
        PRESETS
            .iter()
            .copied()
            .find(|p| p.label.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownPreset {
                label: wanted.to_string(),
                known: PRESETS.iter().map(|p| p.label).collect::<Vec<_>>().join(", "),
            })
    }
}

impl FromStr for Preset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::find(s)
    }
}

/// Combine minute and second fields into a duration.
///
/// Negative fields clamp to zero, so the engine never sees a negative length.
pub fn duration_from_parts(minutes: i64, seconds: i64) -> u64 {
    let minutes = minutes.max(0) as u64;
    let seconds = seconds.max(0) as u64;
    minutes.saturating_mul(60).saturating_add(seconds)
}

/// Parse free-form duration input.
///
/// Accepts plain seconds (`90`), `MM:SS` (`1:30`) and suffixed values
/// (`25s`, `5m`). Anything that doesn't parse, or is negative, counts as zero.
pub fn parse_duration_input(input: &str) -> u64 {
    let input = input.trim();

    if let Some((minutes, seconds)) = input.split_once(':') {
        return duration_from_parts(parse_component(minutes), parse_component(seconds));
    }
    if let Some(minutes) = input.strip_suffix(['m', 'M']) {
        return duration_from_parts(parse_component(minutes), 0);
    }
    if let Some(seconds) = input.strip_suffix(['s', 'S']) {
        return duration_from_parts(0, parse_component(seconds));
    }
    duration_from_parts(0, parse_component(input))
}

fn parse_component(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0)
}
