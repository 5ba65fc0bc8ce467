use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// Failure of a collaborator to produce data for option, column or example resolution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceIoError {
    #[error("cannot read {}: {message}", path.display())]
    Unreadable { path: PathBuf, message: String },

    #[error("example asset not found: {category}/{name}")]
    NotFound { category: String, name: String },

    #[error("cannot parse {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },
}

impl SourceIoError {
    pub fn unreadable(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        SourceIoError::Unreadable {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        SourceIoError::Malformed {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// An example value that should be a `category/filename` pair but is not
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("example reference '{0}' is not of the form category/filename")]
pub struct ExampleRefError(pub String);

/// Raised by the execution collaborator; the message is shown verbatim
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ExecutionError(pub String);

/// Errors returned by [`crate::FormSession`] operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{0}' is not a file input")]
    NotAFileField(String),

    #[error("Field '{0}' does not hold multiple selections")]
    NotMultiValued(String),

    #[error("Please fix validation errors before submitting")]
    Validation(ValidationReport),

    #[error("Failed to execute plugin: {0}")]
    Execution(#[from] ExecutionError),
}
