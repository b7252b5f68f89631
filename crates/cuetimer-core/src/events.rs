use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{CompletionSound, Cue};

/// Every state change of the countdown produces an Event.
/// The shell renders from snapshots; subscribers get these as a log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    ConfigurationUpdated {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// One second elapsed while running (never emitted for the zero-crossing).
    Ticked {
        remaining_secs: u64,
        cue: Option<Cue>,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero.
    TimerCompleted {
        sound: CompletionSound,
        restart_scheduled: bool,
        at: DateTime<Utc>,
    },
    /// A user command arrived while an auto-restart was pending.
    RestartCancelled {
        at: DateTime<Utc>,
    },
    TimerRestarted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
}
