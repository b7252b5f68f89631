//! Countdown engine implementation.
//!
//! The engine is a tick-driven state machine. It does not own any timers -
//! the caller delivers `tick()` once per elapsed second while running and
//! `fire_restart()` once the restart delay has passed. The runner in
//! [`crate::runner`] does exactly that with tokio timers.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Completed -> (RestartPending -> Running)
//!           |  ^
//!           v  |
//!           Idle (pause)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new(config, toggles, CueDispatcher::silent());
//! engine.start();
//! // Once per second:
//! engine.tick();
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cue::{plan_cues, Cue};
use super::display::{format_clock, status_label};
use super::settings::{CompletionSound, FeatureToggles, Preset, TimerConfiguration};
use crate::cues::CueDispatcher;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Idle,
    Running,
    /// Reached zero; `running` already cleared.
    Completed,
    /// Reached zero with auto-restart on; waiting for the restart delay.
    RestartPending,
}

/// Read-only view of the timer for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub remaining_secs: u64,
    pub duration_secs: u64,
    pub running: bool,
    pub toggles: FeatureToggles,
}

impl TimerSnapshot {
    /// `MM:SS` rendering of the remaining time.
    pub fn display(&self) -> String {
        format_clock(self.remaining_secs)
    }

    pub fn status_label(&self) -> &'static str {
        status_label(self)
    }
}

/// Core countdown engine.
///
/// Sole owner and writer of the timer state. Cue emission goes through the
/// injected [`CueDispatcher`], which absorbs playback failures.
pub struct CountdownEngine {
    config: TimerConfiguration,
    toggles: FeatureToggles,
    remaining_secs: u64,
    phase: TimerPhase,
    /// Bumped on every entry into `Running`; lets the driver tell a fresh run
    /// from one it already armed a tick timer for.
    run_epoch: u64,
    cues: CueDispatcher,
}

impl CountdownEngine {
    /// Create an idle engine with the full duration on the clock.
    pub fn new(config: TimerConfiguration, toggles: FeatureToggles, cues: CueDispatcher) -> Self {
        Self {
            config,
            toggles,
            remaining_secs: config.duration_secs,
            phase: TimerPhase::Idle,
            run_epoch: 0,
            cues,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u64 {
        self.config.duration_secs
    }

    pub fn toggles(&self) -> FeatureToggles {
        self.toggles
    }

    pub fn run_epoch(&self) -> u64 {
        self.run_epoch
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            duration_secs: self.config.duration_secs,
            running: self.is_running(),
            toggles: self.toggles,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        match self.phase {
            TimerPhase::Running => None,
            TimerPhase::RestartPending => Some(self.cancel_restart()),
            TimerPhase::Idle | TimerPhase::Completed => {
                if self.remaining_secs == 0 {
                    return None;
                }
                self.enter_running();
                Some(Event::TimerStarted {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.phase {
            TimerPhase::Running => {
                self.phase = TimerPhase::Idle;
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            TimerPhase::RestartPending => Some(self.cancel_restart()),
            _ => None,
        }
    }

    /// Start when stopped, pause when running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.phase = TimerPhase::Idle;
        self.remaining_secs = self.config.duration_secs;
        Some(Event::TimerReset {
            duration_secs: self.config.duration_secs,
            at: Utc::now(),
        })
    }

    /// Replace the duration and reset to it, stopping any run.
    pub fn update_configuration(&mut self, duration_secs: u64) -> Option<Event> {
        self.config = TimerConfiguration::new(duration_secs);
        self.phase = TimerPhase::Idle;
        self.remaining_secs = duration_secs;
        info!(duration = %format_clock(duration_secs), "timer configuration updated");
        Some(Event::ConfigurationUpdated {
            duration_secs,
            at: Utc::now(),
        })
    }

    pub fn apply_preset(&mut self, preset: Preset) -> Option<Event> {
        self.update_configuration(preset.duration_secs)
    }

    pub fn set_toggles(&mut self, toggles: FeatureToggles) {
        self.toggles = toggles;
    }

    pub fn set_completion_sound(&mut self, sound: CompletionSound) {
        self.toggles.completion_sound = sound;
    }

    /// Invert one toggle against the current settings, so back-to-back flips
    /// of different fields all land.
    pub fn flip_tick_sound(&mut self) {
        self.toggles.tick_sound = !self.toggles.tick_sound;
    }

    pub fn flip_voice_countdown(&mut self) {
        self.toggles.voice_countdown = !self.toggles.voice_countdown;
    }

    pub fn flip_auto_restart(&mut self) {
        self.toggles.auto_restart = !self.toggles.auto_restart;
    }

    /// Play the selected completion sound on demand.
    pub fn preview_completion(&self) {
        self.cues.dispatch(Cue::Completion {
            sound: self.toggles.completion_sound,
        });
    }

    /// Advance one second. Call once per elapsed second while running.
    ///
    /// The decrement is committed before cues are dispatched, and emitter
    /// failures never undo it.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::Running {
            debug!(phase = ?self.phase, "ignoring tick outside a run");
            return None;
        }

        let remaining = self.remaining_secs.saturating_sub(1);
        let cue = plan_cues(remaining, &self.toggles);
        self.remaining_secs = remaining;

        if remaining > 0 {
            if let Some(cue) = cue {
                self.cues.dispatch(cue);
            }
            return Some(Event::Ticked {
                remaining_secs: remaining,
                cue,
                at: Utc::now(),
            });
        }

        // Clear `running` before the completion cue goes out.
        self.phase = TimerPhase::Completed;
        if let Some(cue) = cue {
            self.cues.dispatch(cue);
        }
        let restart_scheduled = self.toggles.auto_restart;
        if restart_scheduled {
            self.phase = TimerPhase::RestartPending;
        }
        info!(restart_scheduled, "countdown completed");
        Some(Event::TimerCompleted {
            sound: self.toggles.completion_sound,
            restart_scheduled,
            at: Utc::now(),
        })
    }

    /// Perform a pending auto-restart. Ignored if it was cancelled meanwhile.
    pub fn fire_restart(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::RestartPending {
            debug!(phase = ?self.phase, "ignoring restart that is no longer pending");
            return None;
        }
        self.remaining_secs = self.config.duration_secs;
        if self.remaining_secs == 0 {
            self.phase = TimerPhase::Completed;
            return None;
        }
        self.enter_running();
        Some(Event::TimerRestarted {
            duration_secs: self.config.duration_secs,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter_running(&mut self) {
        self.phase = TimerPhase::Running;
        self.run_epoch += 1;
    }

    fn cancel_restart(&mut self) -> Event {
        debug!("pending restart cancelled by user command");
        self.phase = TimerPhase::Completed;
        Event::RestartCancelled { at: Utc::now() }
    }
}

impl std::fmt::Debug for CountdownEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownEngine")
            .field("config", &self.config)
            .field("toggles", &self.toggles)
            .field("remaining_secs", &self.remaining_secs)
            .field("phase", &self.phase)
            .field("run_epoch", &self.run_epoch)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cues::Recording;

    fn engine(duration_secs: u64, toggles: FeatureToggles) -> (CountdownEngine, Recording) {
        let rec = Recording::default();
        let engine = CountdownEngine::new(
            TimerConfiguration::new(duration_secs),
            toggles,
            CueDispatcher::new(rec.clone(), rec.clone(), rec.clone()),
        );
        (engine, rec)
    }

    fn no_restart() -> FeatureToggles {
        FeatureToggles {
            auto_restart: false,
            ..FeatureToggles::default()
        }
    }

    #[test]
    fn start_pause_resume() {
        let (mut engine, _) = engine(10, FeatureToggles::default());
        assert_eq!(engine.phase(), TimerPhase::Idle);

        assert!(engine.start().is_some());
        assert!(engine.is_running());
        engine.tick();
        engine.tick();

        assert!(engine.pause().is_some());
        assert_eq!(engine.phase(), TimerPhase::Idle);
        assert_eq!(engine.remaining_secs(), 8);

        assert!(engine.start().is_some());
        assert_eq!(engine.remaining_secs(), 8);
        assert!(engine.is_running());
    }

    #[test]
    fn second_start_is_a_no_op() {
        let (mut engine, _) = engine(10, FeatureToggles::default());
        assert!(engine.start().is_some());
        let before = (engine.snapshot(), engine.run_epoch());
        assert!(engine.start().is_none());
        assert_eq!((engine.snapshot(), engine.run_epoch()), before);
    }

    #[test]
    fn pause_while_idle_is_a_no_op() {
        let (mut engine, _) = engine(10, FeatureToggles::default());
        assert!(engine.pause().is_none());
        assert_eq!(engine.phase(), TimerPhase::Idle);
    }

    #[test]
    fn start_with_zero_remaining_is_a_no_op() {
        let (mut engine, rec) = engine(0, FeatureToggles::default());
        assert!(engine.start().is_none());
        assert!(!engine.is_running());
        assert!(rec.cues().is_empty());
    }

    #[test]
    fn reset_restores_duration_from_any_phase() {
        for duration in [0, 1, 7, 3600] {
            let (mut engine, _) = engine(duration, FeatureToggles::default());
            engine.start();
            engine.tick();
            engine.reset();
            let snap = engine.snapshot();
            assert_eq!(snap.remaining_secs, duration);
            assert!(!snap.running);
        }
    }

    #[test]
    fn toggle_alternates() {
        let (mut engine, _) = engine(10, FeatureToggles::default());
        assert!(matches!(engine.toggle(), Some(Event::TimerStarted { .. })));
        assert!(matches!(engine.toggle(), Some(Event::TimerPaused { .. })));
    }

    #[test]
    fn each_tick_decrements_by_one_and_never_goes_negative() {
        let (mut engine, _) = engine(3, no_restart());
        engine.start();
        for expected in [2, 1, 0] {
            engine.tick();
            assert_eq!(engine.remaining_secs(), expected);
        }
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_secs(), 0);
    }

    #[test]
    fn ticks_while_idle_are_ignored() {
        let (mut engine, rec) = engine(10, FeatureToggles::default());
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_secs(), 10);
        assert!(rec.cues().is_empty());
    }

    #[test]
    fn cue_sequence_for_a_full_run() {
        let (mut engine, rec) = engine(7, no_restart());
        engine.start();
        for _ in 0..7 {
            engine.tick();
        }
        assert_eq!(
            rec.cues(),
            vec![
                Cue::Tick,
                Cue::Spoken { number: 5 },
                Cue::Spoken { number: 4 },
                Cue::Spoken { number: 3 },
                Cue::Spoken { number: 2 },
                Cue::Spoken { number: 1 },
                Cue::Completion {
                    sound: CompletionSound::Wisle
                },
            ]
        );
    }

    #[test]
    fn completion_clears_running_and_stays_without_auto_restart() {
        let (mut engine, _) = engine(1, no_restart());
        engine.start();
        let event = engine.tick();
        assert!(matches!(
            event,
            Some(Event::TimerCompleted {
                restart_scheduled: false,
                ..
            })
        ));
        assert_eq!(engine.phase(), TimerPhase::Completed);
        assert!(!engine.snapshot().running);
        assert!(engine.fire_restart().is_none());
        assert_eq!(engine.phase(), TimerPhase::Completed);
    }

    #[test]
    fn auto_restart_goes_through_restart_pending() {
        let (mut engine, _) = engine(2, FeatureToggles::default());
        engine.start();
        engine.tick();
        engine.tick();
        assert_eq!(engine.phase(), TimerPhase::RestartPending);
        assert!(!engine.snapshot().running);

        let epoch = engine.run_epoch();
        assert!(matches!(
            engine.fire_restart(),
            Some(Event::TimerRestarted { duration_secs: 2, .. })
        ));
        assert!(engine.is_running());
        assert_eq!(engine.remaining_secs(), 2);
        assert_eq!(engine.run_epoch(), epoch + 1);
    }

    #[test]
    fn reset_cancels_pending_restart() {
        let (mut engine, _) = engine(1, FeatureToggles::default());
        engine.start();
        engine.tick();
        assert_eq!(engine.phase(), TimerPhase::RestartPending);
        engine.reset();
        assert!(engine.fire_restart().is_none());
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 1);
    }

    #[test]
    fn start_and_pause_cancel_pending_restart() {
        let commands: [fn(&mut CountdownEngine) -> Option<Event>; 2] =
            [CountdownEngine::start, CountdownEngine::pause];
        for cmd in commands {
            let (mut engine, _) = engine(1, FeatureToggles::default());
            engine.start();
            engine.tick();
            assert!(matches!(cmd(&mut engine), Some(Event::RestartCancelled { .. })));
            assert!(engine.fire_restart().is_none());
            assert!(!engine.is_running());
            assert_eq!(engine.remaining_secs(), 0);
        }
    }

    #[test]
    fn update_configuration_cancels_pending_restart() {
        let (mut engine, _) = engine(1, FeatureToggles::default());
        engine.start();
        engine.tick();
        assert_eq!(engine.phase(), TimerPhase::RestartPending);

        assert!(matches!(
            engine.update_configuration(7),
            Some(Event::ConfigurationUpdated { duration_secs: 7, .. })
        ));
        assert_eq!(engine.phase(), TimerPhase::Idle);
        assert!(engine.fire_restart().is_none());
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 7);
        assert_eq!(engine.duration_secs(), 7);
    }

    #[test]
    fn flips_compose() {
        let (mut engine, _) = engine(10, FeatureToggles::default());
        engine.flip_tick_sound();
        engine.flip_voice_countdown();
        let toggles = engine.toggles();
        assert!(!toggles.tick_sound);
        assert!(!toggles.voice_countdown);
        assert!(toggles.auto_restart);
        engine.flip_auto_restart();
        engine.flip_tick_sound();
        assert!(engine.toggles().tick_sound);
        assert!(!engine.toggles().auto_restart);
    }

    #[test]
    fn update_configuration_stops_and_resets() {
        let (mut engine, _) = engine(10, FeatureToggles::default());
        engine.start();
        engine.tick();
        engine.update_configuration(90);
        let snap = engine.snapshot();
        assert_eq!(snap.phase, TimerPhase::Idle);
        assert_eq!(snap.remaining_secs, 90);
        assert_eq!(snap.duration_secs, 90);
        assert!(engine.tick().is_none());
    }

    #[test]
    fn apply_preset_uses_catalog_duration() {
        let (mut engine, _) = engine(10, FeatureToggles::default());
        engine.apply_preset(Preset::find("1m").unwrap());
        assert_eq!(engine.duration_secs(), 60);
        assert_eq!(engine.remaining_secs(), 60);
    }

    #[test]
    fn toggle_changes_apply_on_next_tick() {
        let (mut engine, rec) = engine(10, FeatureToggles::default());
        engine.start();
        engine.tick();
        engine.set_toggles(FeatureToggles {
            tick_sound: false,
            ..engine.toggles()
        });
        engine.tick();
        assert_eq!(rec.cues(), vec![Cue::Tick]);
    }

    #[test]
    fn preview_plays_selected_sound() {
        let (mut engine, rec) = engine(10, FeatureToggles::default());
        engine.set_completion_sound(CompletionSound::SirJade);
        engine.preview_completion();
        assert_eq!(
            rec.cues(),
            vec![Cue::Completion {
                sound: CompletionSound::SirJade
            }]
        );
        assert_eq!(engine.phase(), TimerPhase::Idle);
    }

    #[test]
    fn remaining_never_exceeds_duration() {
        let (mut engine, _) = engine(4, FeatureToggles::default());
        engine.start();
        for _ in 0..20 {
            engine.tick();
            engine.fire_restart();
            assert!(engine.remaining_secs() <= engine.duration_secs());
            if engine.remaining_secs() == 0 {
                assert!(!engine.snapshot().running);
            }
        }
    }

    #[test]
    fn snapshot_status_labels() {
        let (mut engine, _) = engine(2, no_restart());
        assert_eq!(engine.snapshot().status_label(), "Paused");
        engine.start();
        assert_eq!(engine.snapshot().status_label(), "Running...");
        assert_eq!(engine.snapshot().display(), "00:02");
        engine.tick();
        engine.tick();
        assert_eq!(engine.snapshot().status_label(), "Time's Up!");
    }
}
