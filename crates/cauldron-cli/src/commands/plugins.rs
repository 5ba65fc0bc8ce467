use crate::{CliError, GlobalOpts};
use cauldron_config::Config;
use cauldron_logger as logger;
use cauldron_schema::discover_plugins;
use colored::Colorize;
use std::path::PathBuf;

/// List the plugins found in `dir`, or in the configured plugins directory
pub fn list_plugins(opts: &GlobalOpts, dir: Option<PathBuf>) -> Result<(), CliError> {
    let plugins_dir = match dir {
        Some(dir) => dir,
        None => Config::load()?.plugins_dir()?,
    };
    logger::debug(&format!("Scanning plugins in: {}", plugins_dir.display()));

    let plugins = discover_plugins(&plugins_dir)?;
    if plugins.is_empty() {
        println!("There are no plugins in {}", plugins_dir.display());
        return Ok(());
    }

    println!("{}", "Plugins:".bold().green());
    for plugin in &plugins {
        let meta = &plugin.definition.plugin;
        println!(
            "  {} {} [{}] ({})",
            meta.id.cyan().bold(),
            meta.name,
            meta.category,
            plugin.definition.runtime.kind
        );
        if opts.verbosity_level() > 0 {
            println!("    {}", plugin.folder_path.display().to_string().dimmed());
            if !meta.description.is_empty() {
                println!("    {}", meta.description);
            }
        }
    }
    Ok(())
}
