use crate::CliError;
use cauldron_logger as logger;
use cauldron_schema::load_plugin;
use colored::Colorize;
use std::path::Path;

/// Load a plugin folder, reporting lint warnings. Structural problems are errors.
pub fn check_plugin(plugin_dir: &Path) -> Result<(), CliError> {
    let plugin = load_plugin(plugin_dir)?;
    let warnings = plugin.definition.lint();

    logger::success(&format!(
        "{} ({} inputs) is valid",
        plugin.id(),
        plugin.definition.inputs.len()
    ));
    if warnings.is_empty() {
        println!("{} {}", plugin.id().cyan().bold(), "ok".green());
    } else {
        println!("{} {} warning(s)", plugin.id().cyan().bold(), warnings.len());
        for warning in &warnings {
            println!("  {} {}", "warning:".yellow().bold(), warning);
        }
    }
    Ok(())
}
