//! Persistent settings for the cauldron CLI
//!
//! Stored as TOML at `$CAULDRON_CONFIG` when set, otherwise
//! `~/.config/cauldron/cauldron.toml`. A missing file yields defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "CAULDRON_CONFIG";

/// Keys accepted by [`Config::get`] and [`Config::set`]
pub const KNOWN_KEYS: &[&str] = &["plugins-path", "examples-path"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Unknown config key: {0}. Supported keys: plugins-path, examples-path")]
    UnknownKey(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples_path: Option<String>,
}

/// `~/.config/cauldron` (platform config dir on Windows)
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    #[cfg(not(target_os = "windows"))]
    let dir = dirs::home_dir()
        .ok_or(ConfigError::NoHomeDir)?
        .join(".config")
        .join("cauldron");

    #[cfg(target_os = "windows")]
    let dir = dirs::config_dir().ok_or(ConfigError::NoHomeDir)?.join("cauldron");

    Ok(dir)
}

impl Config {
    pub fn path() -> Result<PathBuf, ConfigError> {
        // Explicit override for tests and isolated runs
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }
        Ok(config_dir()?.join("cauldron.toml"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "plugins-path" => self.plugins_path.clone(),
            "examples-path" => self.examples_path.clone(),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "plugins-path" => self.plugins_path = Some(value),
            "examples-path" => self.examples_path = Some(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.plugins_path.is_none() && self.examples_path.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&str, String)> {
        let mut values = Vec::new();
        if let Some(ref val) = self.plugins_path {
            values.push(("plugins-path", val.clone()));
        }
        if let Some(ref val) = self.examples_path {
            values.push(("examples-path", val.clone()));
        }
        values
    }

    /// Directory scanned for plugin folders
    pub fn plugins_dir(&self) -> Result<PathBuf, ConfigError> {
        match self.plugins_path {
            Some(ref p) => Ok(PathBuf::from(p)),
            None => Ok(config_dir()?.join("plugins")),
        }
    }

    /// Root of the example asset tree, laid out as `<category>/<filename>`
    pub fn examples_dir(&self) -> Result<PathBuf, ConfigError> {
        match self.examples_path {
            Some(ref p) => Ok(PathBuf::from(p)),
            None => Ok(config_dir()?.join("examples")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let config = Config::load_from(&dir.path().join("absent.toml"));
        assert!(config.is_ok_and(|c| c.is_empty()));
    }

    #[test]
    fn test_save_and_reload() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let path = dir.path().join("nested").join("cauldron.toml");

        let mut config = Config::default();
        assert!(config.set("examples-path", "/srv/examples".to_string()).is_ok());
        assert!(config.save_to(&path).is_ok());

        let Ok(content) = fs::read_to_string(&path) else {
            assert!(false, "config file should exist");
            return;
        };
        assert!(content.contains("examples-path = \"/srv/examples\""));

        let reloaded = Config::load_from(&path);
        assert!(reloaded.is_ok_and(|c| c.get("examples-path").as_deref() == Some("/srv/examples")
            && c.get("plugins-path").is_none()));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut config = Config::default();
        let result = config.set("python-version", "3.12".to_string());
        assert!(matches!(result, Err(ConfigError::UnknownKey(ref k)) if k == "python-version"));
        assert!(config.is_empty());
    }

    #[test]
    fn test_configured_dirs_take_precedence() {
        let config = Config {
            plugins_path: Some("/opt/plugins".to_string()),
            examples_path: None,
        };
        assert!(config.plugins_dir().is_ok_and(|p| p == Path::new("/opt/plugins")));
        assert_eq!(config.values_iter(), vec![("plugins-path", "/opt/plugins".to_string())]);
    }
}
