//! Cue emitter ports and the dispatcher that shields the engine from them.
//!
//! Emitters are best-effort: they may return an error, but the dispatcher only
//! logs it. Nothing an emitter does can change timer state.

mod command;

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::error::CueError;
use crate::timer::{CompletionSound, Cue};

pub use command::{CommandPlayer, CommandSpeaker, TerminalBell};

/// Plays the short per-second tick.
pub trait TickCueEmitter: Send + Sync {
    fn emit(&self) -> Result<(), CueError>;
}

/// Speaks a final-countdown number (1..=5).
pub trait SpokenNumberEmitter: Send + Sync {
    fn emit(&self, number: u8) -> Result<(), CueError>;
}

/// Plays the completion sound. Must be a silent no-op for
/// [`CompletionSound::None`].
pub trait CompletionCueEmitter: Send + Sync {
    fn emit(&self, sound: CompletionSound) -> Result<(), CueError>;
}

impl<T: TickCueEmitter + ?Sized> TickCueEmitter for Box<T> {
    fn emit(&self) -> Result<(), CueError> {
        (**self).emit()
    }
}

impl<T: SpokenNumberEmitter + ?Sized> SpokenNumberEmitter for Box<T> {
    fn emit(&self, number: u8) -> Result<(), CueError> {
        (**self).emit(number)
    }
}

impl<T: CompletionCueEmitter + ?Sized> CompletionCueEmitter for Box<T> {
    fn emit(&self, sound: CompletionSound) -> Result<(), CueError> {
        (**self).emit(sound)
    }
}

/// Routes planned cues to the three emitters.
pub struct CueDispatcher {
    tick: Box<dyn TickCueEmitter>,
    spoken: Box<dyn SpokenNumberEmitter>,
    completion: Box<dyn CompletionCueEmitter>,
}

impl CueDispatcher {
    pub fn new(
        tick: impl TickCueEmitter + 'static,
        spoken: impl SpokenNumberEmitter + 'static,
        completion: impl CompletionCueEmitter + 'static,
    ) -> Self {
        Self {
            tick: Box::new(tick),
            spoken: Box::new(spoken),
            completion: Box::new(completion),
        }
    }

    pub fn silent() -> Self {
        Self::new(Silent, Silent, Silent)
    }

    /// Emit one cue. Failures are logged and swallowed.
    pub fn dispatch(&self, cue: Cue) {
        debug!(?cue, "emitting cue");
        let result = match cue {
            Cue::Tick => self.tick.emit(),
            Cue::Spoken { number } => self.spoken.emit(number),
            Cue::Completion { sound } => self.completion.emit(sound),
        };
        if let Err(e) = result {
            warn!(?cue, error = %e, "cue playback failed");
        }
    }
}

/// Emitter that does nothing, for all three capabilities.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl TickCueEmitter for Silent {
    fn emit(&self) -> Result<(), CueError> {
        Ok(())
    }
}

impl SpokenNumberEmitter for Silent {
    fn emit(&self, _number: u8) -> Result<(), CueError> {
        Ok(())
    }
}

impl CompletionCueEmitter for Silent {
    fn emit(&self, _sound: CompletionSound) -> Result<(), CueError> {
        Ok(())
    }
}

/// In-memory emitter that records every cue it receives.
///
/// Clones share the same log, so one handle can be given to the dispatcher
/// and another kept for inspection. The `none` completion sound is not
/// recorded, mirroring a real player's no-op.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    log: Arc<Mutex<Vec<Cue>>>,
}

impl Recording {
    pub fn cues(&self) -> Vec<Cue> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn push(&self, cue: Cue) {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).push(cue);
    }
}

impl TickCueEmitter for Recording {
    fn emit(&self) -> Result<(), CueError> {
        self.push(Cue::Tick);
        Ok(())
    }
}

impl SpokenNumberEmitter for Recording {
    fn emit(&self, number: u8) -> Result<(), CueError> {
        self.push(Cue::Spoken { number });
        Ok(())
    }
}

impl CompletionCueEmitter for Recording {
    fn emit(&self, sound: CompletionSound) -> Result<(), CueError> {
        if !sound.is_silent() {
            self.push(Cue::Completion { sound });
        }
        Ok(())
    }
}
