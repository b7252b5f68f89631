//! Emitters backed by the terminal and external programs.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tokio::runtime::Handle;
use tracing::debug;

use super::{CompletionCueEmitter, SpokenNumberEmitter, TickCueEmitter};
use crate::error::CueError;
use crate::timer::CompletionSound;

/// Tick emitter that rings the terminal bell on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl TickCueEmitter for TerminalBell {
    fn emit(&self) -> Result<(), CueError> {
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")
            .and_then(|_| err.flush())
            .map_err(|e| CueError::DeviceNotAvailable(format!("terminal: {e}")))
    }
}

/// A program plus leading arguments, split from a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ProgramLine {
    program: String,
    args: Vec<String>,
}

impl ProgramLine {
    fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    fn command(&self, extra: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(extra)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }

    /// Run with `extra` appended.
    ///
    /// Inside a tokio runtime the child is spawned through `tokio::process`
    /// and dropped without waiting; the runtime reaps it when it exits.
    /// Without a runtime the call blocks until the program finishes.
    fn spawn(&self, extra: &str) -> Result<(), CueError> {
        let unavailable =
            |e: std::io::Error| CueError::DeviceNotAvailable(format!("{}: {e}", self.program));

        if Handle::try_current().is_ok() {
            let child = tokio::process::Command::from(self.command(extra))
                .spawn()
                .map_err(unavailable)?;
            debug!(program = %self.program, arg = extra, pid = ?child.id(), "spawned cue process");
            return Ok(());
        }

        let status = self.command(extra).status().map_err(unavailable)?;
        debug!(program = %self.program, arg = extra, %status, "cue process finished");
        if status.success() {
            Ok(())
        } else {
            Err(CueError::PlaybackFailed(format!("{} exited with {status}", self.program)))
        }
    }
}

/// Spoken-number emitter that runs a speech command such as `espeak` or
/// `say` with the number as its last argument.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    line: ProgramLine,
}

impl CommandSpeaker {
    /// Returns `None` for an empty command line.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        ProgramLine::parse(command_line).map(|line| Self { line })
    }
}

impl SpokenNumberEmitter for CommandSpeaker {
    fn emit(&self, number: u8) -> Result<(), CueError> {
        self.line.spawn(&number.to_string())
    }
}

/// Completion emitter that hands the sound's asset file to an audio player.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    line: ProgramLine,
    sounds_dir: PathBuf,
}

impl CommandPlayer {
    /// Returns `None` for an empty command line.
    pub fn from_command_line(command_line: &str, sounds_dir: impl Into<PathBuf>) -> Option<Self> {
        ProgramLine::parse(command_line).map(|line| Self {
            line,
            sounds_dir: sounds_dir.into(),
        })
    }

    pub fn sound_path(&self, sound: CompletionSound) -> Option<PathBuf> {
        sound.asset_file().map(|file| self.sounds_dir.join(file))
    }
}

impl CompletionCueEmitter for CommandPlayer {
    fn emit(&self, sound: CompletionSound) -> Result<(), CueError> {
        let Some(path) = self.sound_path(sound) else {
            return Ok(());
        };
        if !path.is_file() {
            return Err(CueError::PlaybackFailed(format!(
                "sound file not found: {}",
                path.display()
            )));
        }
        self.line.spawn(&path.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_line_splits_arguments() {
        let line = ProgramLine::parse("  mpg123 -q  ").unwrap();
        assert_eq!(line.program, "mpg123");
        assert_eq!(line.args, vec!["-q".to_string()]);
        assert!(ProgramLine::parse("   ").is_none());
    }

    #[test]
    fn player_is_a_no_op_for_none() {
        let player = CommandPlayer::from_command_line("definitely-not-a-player", "/nowhere").unwrap();
        assert!(player.emit(CompletionSound::None).is_ok());
    }

    #[test]
    fn player_reports_missing_asset() {
        let dir = tempfile::tempdir().unwrap();
        let player = CommandPlayer::from_command_line("mpg123 -q", dir.path()).unwrap();
        assert_eq!(
            player.sound_path(CompletionSound::SirJade),
            Some(dir.path().join("sir-jade.mp3"))
        );
        assert!(matches!(
            player.emit(CompletionSound::Wisle),
            Err(CueError::PlaybackFailed(_))
        ));
    }

    #[test]
    fn speaker_reports_missing_program() {
        let speaker = CommandSpeaker::from_command_line("cuetimer-no-such-speech-binary").unwrap();
        assert!(matches!(speaker.emit(3), Err(CueError::DeviceNotAvailable(_))));
    }

    #[cfg(unix)]
    #[test]
    fn without_runtime_the_exit_status_is_checked() {
        let ok = CommandSpeaker::from_command_line("true").unwrap();
        assert!(ok.emit(2).is_ok());
        let failing = CommandSpeaker::from_command_line("false").unwrap();
        assert!(matches!(failing.emit(2), Err(CueError::PlaybackFailed(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn inside_runtime_emit_returns_without_waiting() {
        let speaker = CommandSpeaker::from_command_line("sleep").unwrap();
        let started = std::time::Instant::now();
        for _ in 0..20 {
            speaker.emit(5).unwrap();
        }
        assert!(started.elapsed() < std::time::Duration::from_secs(5));

        let missing = CommandSpeaker::from_command_line("cuetimer-no-such-speech-binary").unwrap();
        assert!(matches!(missing.emit(3), Err(CueError::DeviceNotAvailable(_))));
    }
}
