//! Error type shared by the cauldron command handlers

use cauldron_config::ConfigError;
use cauldron_form::FormError;
use cauldron_schema::{FieldKind, SchemaError};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected name=value, got '{0}'")]
    InvalidAssignment(String),

    #[error("Invalid value '{value}' for {kind:?} field '{field}'")]
    InvalidValue {
        field: String,
        value: String,
        kind: FieldKind,
    },

    #[error("{0} validation error(s)")]
    ValidationFailed(usize),
}
