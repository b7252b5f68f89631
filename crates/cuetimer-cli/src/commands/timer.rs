use std::io::IsTerminal;

use clap::Args;
use cuetimer_core::runner::{self, Command};
use cuetimer_core::{
    parse_duration_input, CommandPlayer, CommandSpeaker, CompletionCueEmitter, CompletionSound,
    Config, CountdownEngine, CueDispatcher, Event, FeatureToggles, Preset, Silent,
    SpokenNumberEmitter, TerminalBell, TimerConfiguration, TimerSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

const INPUT_HELP: &str = "commands: s start/pause | r reset | u <duration> | p <preset> | \
t tick | v voice | a auto-restart | n <sound> | x test sound | q quit";

#[derive(Args, Debug)]
pub struct TimerArgs {
    /// Countdown length: seconds, MM:SS, or with an s/m suffix
    #[arg(short, long, conflicts_with = "preset", allow_hyphen_values = true)]
    duration: Option<String>,
    /// Preset duration (25s, 1m, 5m, 10m)
    #[arg(short, long)]
    preset: Option<Preset>,
    /// Disable the per-second tick
    #[arg(long)]
    no_tick: bool,
    /// Disable the spoken 5..1 countdown
    #[arg(long)]
    no_voice: bool,
    /// Stop at zero instead of restarting
    #[arg(long)]
    no_auto_restart: bool,
    /// Completion sound id
    #[arg(long)]
    sound: Option<CompletionSound>,
    /// Do not play any audio
    #[arg(long)]
    silent: bool,
    /// Start counting immediately
    #[arg(long)]
    autostart: bool,
    /// Exit the first time the countdown reaches zero
    #[arg(long)]
    exit_on_complete: bool,
    /// Print events as JSON lines instead of a status line
    #[arg(long)]
    json: bool,
}

/// A parsed line of stdin.
#[derive(Debug, PartialEq)]
enum Input {
    Command(Command),
    Quit,
}

fn parse_input(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let input = match word {
        "" => return Ok(None),
        "s" | "start" | "pause" => Input::Command(Command::Toggle),
        "r" | "reset" => Input::Command(Command::Reset),
        "u" | "update" => Input::Command(Command::UpdateConfiguration(parse_duration_input(rest))),
        "p" | "preset" => {
            Input::Command(Command::ApplyPreset(rest.parse::<Preset>().map_err(|e| e.to_string())?))
        }
        "n" | "sound" => Input::Command(Command::SetCompletionSound(
            rest.parse::<CompletionSound>().map_err(|e| e.to_string())?,
        )),
        "x" | "test" => Input::Command(Command::PreviewCompletion),
        "t" | "tick" => Input::Command(Command::FlipTickSound),
        "v" | "voice" => Input::Command(Command::FlipVoiceCountdown),
        "a" | "auto" => Input::Command(Command::FlipAutoRestart),
        "q" | "quit" => Input::Quit,
        other => return Err(format!("unknown command '{other}'; {INPUT_HELP}")),
    };
    Ok(Some(input))
}

fn toggles_for(args: &TimerArgs, config: &Config) -> FeatureToggles {
    let base = config.toggles();
    FeatureToggles {
        tick_sound: base.tick_sound && !args.no_tick,
        voice_countdown: base.voice_countdown && !args.no_voice,
        auto_restart: base.auto_restart && !args.no_auto_restart,
        completion_sound: args.sound.unwrap_or(base.completion_sound),
    }
}

fn duration_for(args: &TimerArgs, config: &Config) -> u64 {
    match (&args.duration, args.preset) {
        (Some(raw), _) => parse_duration_input(raw),
        (None, Some(preset)) => preset.duration_secs,
        (None, None) => config.timer.duration_secs,
    }
}

fn cues_for(args: &TimerArgs, config: &Config) -> CueDispatcher {
    if args.silent {
        return CueDispatcher::silent();
    }
    let speaker: Box<dyn SpokenNumberEmitter> =
        match CommandSpeaker::from_command_line(&config.audio.speech_command) {
            Some(speaker) => Box::new(speaker),
            None => Box::new(Silent),
        };
    let player: Box<dyn CompletionCueEmitter> = match CommandPlayer::from_command_line(
        &config.audio.player_command,
        &config.audio.sounds_dir,
    ) {
        Some(player) => Box::new(player),
        None => Box::new(Silent),
    };
    CueDispatcher::new(TerminalBell, speaker, player)
}

fn status_line(snapshot: &TimerSnapshot) -> String {
    format!("{}  {}", snapshot.display(), snapshot.status_label())
}

pub fn run(args: TimerArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_async(args, config))
}

async fn run_async(args: TimerArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let engine = CountdownEngine::new(
        TimerConfiguration::new(duration_for(&args, config)),
        toggles_for(&args, config),
        cues_for(&args, config),
    );
    let (handle, task) = runner::spawn(engine);
    let mut snapshots = handle.watch();
    let mut events = handle.subscribe();

    if std::io::stdin().is_terminal() {
        eprintln!("{INPUT_HELP}");
    }
    if args.autostart {
        handle.start()?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut last_line = String::new();
    let mut render = |snapshot: &TimerSnapshot| {
        let line = status_line(snapshot);
        if !args.json && line != last_line {
            println!("{line}");
            last_line = line;
        }
    };
    render(&handle.observe());

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                render(&snapshot);
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if args.json {
                        println!("{}", serde_json::to_string(&event)?);
                    }
                    if args.exit_on_complete && matches!(event, Event::TimerCompleted { .. }) {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => warn!(missed, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => match parse_input(&line) {
                    Ok(Some(Input::Quit)) => break,
                    Ok(Some(Input::Command(command))) => handle.send(command)?,
                    Ok(None) => {}
                    Err(message) => eprintln!("{message}"),
                },
                None => {
                    stdin_open = false;
                    if !args.exit_on_complete {
                        break;
                    }
                }
            },
        }
    }

    render(&handle.observe());
    // The runner may already be gone if the channel closed.
    let _ = handle.shutdown();
    task.await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: TimerArgs,
    }

    fn args(argv: &[&str]) -> TimerArgs {
        let mut full = vec!["cuetimer-cli"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).args
    }

    #[test]
    fn parses_line_commands() {
        assert_eq!(parse_input("s").unwrap(), Some(Input::Command(Command::Toggle)));
        assert_eq!(parse_input("  ").unwrap(), None);
        assert_eq!(
            parse_input("u 1:30").unwrap(),
            Some(Input::Command(Command::UpdateConfiguration(90)))
        );
        assert_eq!(
            parse_input("u -4").unwrap(),
            Some(Input::Command(Command::UpdateConfiguration(0)))
        );
        assert_eq!(
            parse_input("p 10m").unwrap(),
            Some(Input::Command(Command::ApplyPreset(Preset::find("10m").unwrap())))
        );
        assert_eq!(
            parse_input("n sir-jade").unwrap(),
            Some(Input::Command(Command::SetCompletionSound(CompletionSound::SirJade)))
        );
        assert_eq!(
            parse_input("v").unwrap(),
            Some(Input::Command(Command::FlipVoiceCountdown))
        );
        assert_eq!(parse_input("t").unwrap(), Some(Input::Command(Command::FlipTickSound)));
        assert_eq!(parse_input("a").unwrap(), Some(Input::Command(Command::FlipAutoRestart)));
        assert_eq!(parse_input("q").unwrap(), Some(Input::Quit));
    }

    #[test]
    fn rejects_unknown_line_commands() {
        assert!(parse_input("jump").is_err());
        assert!(parse_input("p 3h").is_err());
        assert!(parse_input("n klaxon").is_err());
    }

    #[test]
    fn flags_override_config() {
        let config = Config::default();
        let args = args(&["--no-voice", "--sound", "none", "--duration", "2m"]);
        let toggles = toggles_for(&args, &config);
        assert!(toggles.tick_sound);
        assert!(!toggles.voice_countdown);
        assert!(toggles.auto_restart);
        assert_eq!(toggles.completion_sound, CompletionSound::None);
        assert_eq!(duration_for(&args, &config), 120);
    }

    #[test]
    fn preset_or_config_duration() {
        let config = Config::default();
        assert_eq!(duration_for(&args(&["--preset", "25s"]), &config), 25);
        assert_eq!(duration_for(&args(&[]), &config), 300);
    }

    #[test]
    fn negative_duration_is_a_value() {
        let config = Config::default();
        assert_eq!(duration_for(&args(&["--duration", "-5"]), &config), 0);
        assert_eq!(duration_for(&args(&["-d", "-90"]), &config), 0);
    }

    #[test]
    fn duration_and_preset_conflict() {
        let result = Harness::try_parse_from(["cuetimer-cli", "--duration", "5", "--preset", "1m"]);
        assert!(result.is_err());
    }
}
