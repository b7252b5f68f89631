use std::path::Path;

use clap::Subcommand;
use cuetimer_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "cues.tick_sound", "timer.duration_secs")
        key: String,
    },
    /// Show the effective configuration
    Show,
    /// Print the config file location
    Path,
}

pub fn run(action: ConfigAction, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = crate::load_config(path)?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Show => {
            let config = crate::load_config(path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            let path = path.map(Path::to_path_buf).unwrap_or_else(Config::path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
