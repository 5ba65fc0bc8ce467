use crate::{CliError, GlobalOpts};
use cauldron_config::{Config, KNOWN_KEYS};
use cauldron_logger as logger;
use clap::Subcommand;
use colored::Colorize;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value (plugins-path, examples-path)
    Set { key: String, value: String },
    /// Show the path to the config file
    Path,
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<(), CliError> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
            if opts.verbosity_level() > 0 {
                println!("  {}: {}", "known keys".dimmed(), KNOWN_KEYS.join(", "));
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, value.clone())?;
            let path = config.save()?;
            logger::debug(&format!("Wrote config to: {}", path.display()));
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
    }
    Ok(())
}
