//! Per-tick cue decisions.
//!
//! At most one cue fires per tick. Precedence, highest first:
//!
//! ```text
//! remaining == 0                    -> Completion
//! voice on and 1..=5 remaining      -> Spoken(n)   (tick suppressed)
//! tick sound on                     -> Tick
//! otherwise                         -> nothing
//! ```

use serde::{Deserialize, Serialize};

use super::settings::{CompletionSound, FeatureToggles};

/// Highest number spoken aloud during the final countdown.
pub const VOICE_COUNTDOWN_FROM: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum Cue {
    Tick,
    Spoken { number: u8 },
    Completion { sound: CompletionSound },
}

/// Decide which cue, if any, accompanies the tick that leaves
/// `new_remaining` seconds on the clock.
pub fn plan_cues(new_remaining: u64, toggles: &FeatureToggles) -> Option<Cue> {
    if new_remaining == 0 {
        return Some(Cue::Completion {
            sound: toggles.completion_sound,
        });
    }
    if toggles.voice_countdown && new_remaining <= VOICE_COUNTDOWN_FROM {
        return Some(Cue::Spoken {
            number: new_remaining as u8,
        });
    }
    if toggles.tick_sound {
        return Some(Cue::Tick);
    }
    None
}
