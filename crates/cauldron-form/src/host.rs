//! Collaborators the engine consumes
//!
//! Everything that touches the outside world sits behind one of these
//! traits. File reads and submission are async; notifications are
//! fire-and-forget.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{ExecutionError, SourceIoError};
use crate::normalize::NormalizedValues;

/// Reads file contents for option and column resolution
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Full text of a file
    async fn read_file_text(&self, path: &Path) -> Result<String, SourceIoError>;

    /// First line of a file without its line terminator, for header previews
    async fn read_first_line(&self, path: &Path) -> Result<String, SourceIoError>;
}

/// Maps a `category/filename` example reference to a concrete path
#[async_trait]
pub trait ExampleLocator: Send + Sync {
    async fn resolve_example_asset(&self, category: &str, name: &str) -> Result<PathBuf, SourceIoError>;
}

/// Native file picker; `None` means the user cancelled
#[async_trait]
pub trait FilePicker: Send + Sync {
    async fn open_file_picker(&self, title: &str) -> Option<PathBuf>;
}

/// User-facing toasts
pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
    fn notify_success(&self, message: &str);
}

/// Hands a normalized form to the host process for execution
#[async_trait]
pub trait ExecutionSink: Send + Sync {
    async fn submit_for_execution(&self, request: &ExecutionRequest) -> Result<JobId, ExecutionError>;
}

/// Payload handed to the execution collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub plugin_id: String,
    pub parameters: NormalizedValues,
}

/// Opaque job identifier returned by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The set of collaborators one session talks to
#[derive(Clone)]
pub struct Host {
    pub files: Arc<dyn FileSource>,
    pub examples: Arc<dyn ExampleLocator>,
    pub picker: Arc<dyn FilePicker>,
    pub notifier: Arc<dyn Notifier>,
    pub executor: Arc<dyn ExecutionSink>,
}

impl Host {
    pub fn new(
        files: Arc<dyn FileSource>,
        examples: Arc<dyn ExampleLocator>,
        picker: Arc<dyn FilePicker>,
        notifier: Arc<dyn Notifier>,
        executor: Arc<dyn ExecutionSink>,
    ) -> Self {
        Host {
            files,
            examples,
            picker,
            notifier,
            executor,
        }
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
