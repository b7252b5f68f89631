//! Async driver for [`CountdownEngine`].
//!
//! One task owns the engine and is its only writer. It waits on three
//! sources at once and handles whichever wakes first, to completion:
//!
//! - user commands from [`CountdownHandle`]
//! - the periodic tick timer (armed only while `Running`)
//! - the restart delay (armed only while `RestartPending`)
//!
//! After every wake-up the timers are re-synced to the engine phase. Leaving
//! `Running` drops the tick interval, and every new run (tracked by the
//! engine's run epoch) gets a fresh interval whose first tick is one full
//! second away. A stale interval can never deliver a second decrement.

use std::future::pending;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::timer::{CompletionSound, CountdownEngine, FeatureToggles, Preset, TimerPhase, TimerSnapshot};

/// Nominal tick period.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// Delay between completion and the automatic restart.
pub const RESTART_DELAY: Duration = Duration::from_secs(1);

const EVENT_CAPACITY: usize = 64;

/// Commands accepted by the runner.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Reset,
    UpdateConfiguration(u64),
    ApplyPreset(Preset),
    SetToggles(FeatureToggles),
    SetCompletionSound(CompletionSound),
    /// Invert one toggle inside the runner, against whatever is current
    /// when the command is applied.
    FlipTickSound,
    FlipVoiceCountdown,
    FlipAutoRestart,
    PreviewCompletion,
    Shutdown,
}

/// Cloneable front door to a running countdown.
#[derive(Debug, Clone)]
pub struct CountdownHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<TimerSnapshot>,
    events: broadcast::Sender<Event>,
}

impl CountdownHandle {
    pub fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| CoreError::RunnerClosed)
    }

    pub fn start(&self) -> Result<()> {
        self.send(Command::Start)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    pub fn toggle(&self) -> Result<()> {
        self.send(Command::Toggle)
    }

    pub fn reset(&self) -> Result<()> {
        self.send(Command::Reset)
    }

    pub fn update_configuration(&self, duration_secs: u64) -> Result<()> {
        self.send(Command::UpdateConfiguration(duration_secs))
    }

    pub fn apply_preset(&self, preset: Preset) -> Result<()> {
        self.send(Command::ApplyPreset(preset))
    }

    pub fn set_toggles(&self, toggles: FeatureToggles) -> Result<()> {
        self.send(Command::SetToggles(toggles))
    }

    pub fn set_completion_sound(&self, sound: CompletionSound) -> Result<()> {
        self.send(Command::SetCompletionSound(sound))
    }

    pub fn preview_completion(&self) -> Result<()> {
        self.send(Command::PreviewCompletion)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    /// Latest published state.
    pub fn observe(&self) -> TimerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that wakes whenever a new snapshot is published.
    pub fn watch(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

/// Spawn the runner task on the current tokio runtime.
pub fn spawn(engine: CountdownEngine) -> (CountdownHandle, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
    let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

    let task = tokio::spawn(run(engine, command_rx, snapshot_tx, event_tx.clone()));
    let handle = CountdownHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        events: event_tx,
    };
    (handle, task)
}

enum Wake {
    Command(Option<Command>),
    Tick,
    Restart,
}

/// The two timers the runner may hold. At most one tick interval exists.
#[derive(Default)]
struct Timers {
    tick: Option<(u64, Interval)>,
    restart: Option<Pin<Box<Sleep>>>,
}

impl Timers {
    fn sync(&mut self, engine: &CountdownEngine) {
        match engine.phase() {
            TimerPhase::Running => {
                let epoch = engine.run_epoch();
                if self.tick.as_ref().map(|(armed, _)| *armed) != Some(epoch) {
                    let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    debug!(epoch, "arming tick timer");
                    self.tick = Some((epoch, interval));
                }
            }
            _ => {
                if self.tick.take().is_some() {
                    debug!("tick timer cancelled");
                }
            }
        }

        if engine.phase() == TimerPhase::RestartPending {
            if self.restart.is_none() {
                debug!("arming restart timer");
                self.restart = Some(Box::pin(sleep(RESTART_DELAY)));
            }
        } else if self.restart.take().is_some() {
            debug!("restart timer cancelled");
        }
    }
}

async fn next_tick(tick: &mut Option<(u64, Interval)>) {
    match tick {
        Some((_, interval)) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}

async fn restart_due(restart: &mut Option<Pin<Box<Sleep>>>) {
    match restart {
        Some(delay) => delay.as_mut().await,
        None => pending().await,
    }
}

fn apply(engine: &mut CountdownEngine, command: Command) -> Option<Event> {
    match command {
        Command::Start => engine.start(),
        Command::Pause => engine.pause(),
        Command::Toggle => engine.toggle(),
        Command::Reset => engine.reset(),
        Command::UpdateConfiguration(secs) => engine.update_configuration(secs),
        Command::ApplyPreset(preset) => engine.apply_preset(preset),
        Command::SetToggles(toggles) => {
            engine.set_toggles(toggles);
            None
        }
        Command::SetCompletionSound(sound) => {
            engine.set_completion_sound(sound);
            None
        }
        Command::FlipTickSound => {
            engine.flip_tick_sound();
            None
        }
        Command::FlipVoiceCountdown => {
            engine.flip_voice_countdown();
            None
        }
        Command::FlipAutoRestart => {
            engine.flip_auto_restart();
            None
        }
        Command::PreviewCompletion => {
            engine.preview_completion();
            None
        }
        Command::Shutdown => None,
    }
}

async fn run(
    mut engine: CountdownEngine,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<TimerSnapshot>,
    events: broadcast::Sender<Event>,
) {
    info!(duration_secs = engine.duration_secs(), "countdown runner started");
    let mut timers = Timers::default();

    loop {
        timers.sync(&engine);

        let wake = tokio::select! {
            command = commands.recv() => Wake::Command(command),
            _ = next_tick(&mut timers.tick) => Wake::Tick,
            _ = restart_due(&mut timers.restart) => Wake::Restart,
        };

        let event = match wake {
            Wake::Command(None) | Wake::Command(Some(Command::Shutdown)) => break,
            Wake::Command(Some(command)) => {
                debug!(?command, "command received");
                apply(&mut engine, command)
            }
            Wake::Tick => engine.tick(),
            Wake::Restart => {
                // The delay is spent whatever the outcome.
                timers.restart = None;
                engine.fire_restart()
            }
        };

        snapshots.send_replace(engine.snapshot());
        if let Some(event) = event {
            // No subscribers is fine.
            let _ = events.send(event);
        }
    }

    info!("countdown runner stopped");
}
