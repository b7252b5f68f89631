use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use cuetimer_core::{Config, CoreError};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "cuetimer-cli", version, about = "Cuetimer CLI")]
struct Cli {
    /// Config file (default: $CUETIMER_CONFIG or ~/.config/cuetimer/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the countdown interactively
    Timer(commands::timer::TimerArgs),
    /// List preset durations
    Presets,
    /// Completion sounds
    Sounds {
        #[command(subcommand)]
        action: commands::sounds::SoundsAction,
    },
    /// Configuration inspection
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a duration as MM:SS
    Format {
        /// Seconds, MM:SS, or a value with an s/m suffix
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("cuetimer_core=debug,cuetimer_cli=debug")
    } else {
        EnvFilter::try_from_env("CUETIMER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config, CoreError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Timer(args) => load_config(config_path)
            .map_err(Into::into)
            .and_then(|config| commands::timer::run(args, &config)),
        Commands::Presets => commands::presets::run(),
        Commands::Sounds { action } => load_config(config_path)
            .map_err(Into::into)
            .and_then(|config| commands::sounds::run(action, &config)),
        Commands::Config { action } => commands::config::run(action, config_path),
        Commands::Format { value } => commands::format::run(&value),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
