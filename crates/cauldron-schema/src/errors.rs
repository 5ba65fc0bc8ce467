use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating a plugin definition
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse plugin definition: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid plugin definition: {0}")]
    Invalid(String),

    #[error("Script file not found: {}", .0.display())]
    ScriptNotFound(PathBuf),
}
