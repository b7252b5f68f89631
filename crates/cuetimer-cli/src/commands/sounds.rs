use clap::Subcommand;
use cuetimer_core::{CommandPlayer, CompletionCueEmitter, CompletionSound, Config};

#[derive(Subcommand)]
pub enum SoundsAction {
    /// List completion sounds (* marks the configured one)
    List,
    /// Play a completion sound now
    Test {
        /// Sound id (defaults to the configured sound)
        sound: Option<CompletionSound>,
    },
}

pub fn run(action: SoundsAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SoundsAction::List => {
            for sound in CompletionSound::ALL {
                let marker = if sound == config.cues.completion_sound { "*" } else { " " };
                println!("{marker} {:<9} {}", sound.id(), sound.display_name());
            }
        }
        SoundsAction::Test { sound } => {
            let sound = sound.unwrap_or(config.cues.completion_sound);
            if sound.is_silent() {
                println!("No Sound Selected");
                return Ok(());
            }
            let player = CommandPlayer::from_command_line(
                &config.audio.player_command,
                &config.audio.sounds_dir,
            )
            .ok_or("audio.player_command is empty")?;
            player.emit(sound)?;
            println!("playing {}", sound.display_name());
        }
    }
    Ok(())
}
