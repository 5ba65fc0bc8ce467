//! Loading plugin definitions from disk
//!
//! A plugin folder holds a `plugin.yaml` (or an OS-specific
//! `plugin.<os>.yaml`) and the script it names. Discovery walks the direct
//! subfolders of a plugins directory.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::SchemaError;
use crate::types::{Plugin, PluginDefinition};

/// Candidate definition file names, most specific first
fn definition_candidates() -> [String; 4] {
    let os = std::env::consts::OS;
    [
        format!("plugin.{}.yaml", os),
        format!("plugin.{}.yml", os),
        "plugin.yaml".to_string(),
        "plugin.yml".to_string(),
    ]
}

/// Path of the definition file for a plugin folder.
/// Falls back to `plugin.yaml` when none of the candidates exist.
pub fn definition_path(plugin_dir: &Path) -> PathBuf {
    definition_candidates()
        .iter()
        .map(|name| plugin_dir.join(name))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| plugin_dir.join("plugin.yaml"))
}

/// Read and parse a definition file without validating it
pub fn read_definition(path: &Path) -> Result<PluginDefinition, SchemaError> {
    debug!("Reading plugin definition from: {:?}", path);
    let content = fs::read_to_string(path)?;
    let definition = PluginDefinition::from_yaml_str(&content)?;
    Ok(definition)
}

/// Load, validate and locate the script of the plugin in `plugin_dir`
pub fn load_plugin(plugin_dir: &Path) -> Result<Plugin, SchemaError> {
    let definition = read_definition(&definition_path(plugin_dir))?;
    definition.validate()?;

    for warning in definition.lint() {
        warn!("[{}] {}", definition.plugin.id, warning);
    }

    let script_path = plugin_dir.join(&definition.runtime.script);
    if !script_path.is_file() {
        return Err(SchemaError::ScriptNotFound(script_path));
    }

    Ok(Plugin {
        definition,
        folder_path: plugin_dir.to_path_buf(),
        script_path,
    })
}

/// Load every plugin found directly under `plugins_dir`.
///
/// Folders that fail to load are logged and skipped. A missing plugins
/// directory yields an empty list. Plugins are sorted by id.
pub fn discover_plugins(plugins_dir: &Path) -> Result<Vec<Plugin>, SchemaError> {
    if !plugins_dir.exists() {
        debug!("Plugins directory does not exist: {:?}", plugins_dir);
        return Ok(Vec::new());
    }

    let mut plugins = Vec::new();
    for entry in WalkDir::new(plugins_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| SchemaError::Io(e.into()))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        match load_plugin(entry.path()) {
            Ok(plugin) => {
                debug!(
                    "Loaded plugin: {} ({}) from {:?}",
                    plugin.definition.plugin.name,
                    plugin.id(),
                    entry.path()
                );
                plugins.push(plugin);
            }
            Err(e) => {
                warn!("Failed to load plugin from {:?}: {}", entry.path(), e);
            }
        }
    }

    plugins.sort_by(|a, b| a.id().cmp(b.id()));
    info!("Loaded {} plugins from {:?}", plugins.len(), plugins_dir);
    Ok(plugins)
}
