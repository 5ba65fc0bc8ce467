//! Collaborators backing a form session on the command line

use async_trait::async_trait;
use cauldron_form::{
    ExampleLocator, ExecutionError, ExecutionRequest, ExecutionSink, FilePicker, FileSource, Host, JobId,
    Notifier, SourceIoError,
};
use cauldron_logger as logger;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Reads straight from the local filesystem
#[derive(Debug, Default)]
pub struct DiskFiles;

#[async_trait]
impl FileSource for DiskFiles {
    async fn read_file_text(&self, path: &Path) -> Result<String, SourceIoError> {
        fs::read_to_string(path).map_err(|e| SourceIoError::unreadable(path, e))
    }

    async fn read_first_line(&self, path: &Path) -> Result<String, SourceIoError> {
        let file = fs::File::open(path).map_err(|e| SourceIoError::unreadable(path, e))?;
        let mut line = String::new();
        BufReader::new(file)
            .read_line(&mut line)
            .map_err(|e| SourceIoError::unreadable(path, e))?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Resolves `category/filename` under an examples root
#[derive(Debug, Clone)]
pub struct ExamplesDir {
    root: PathBuf,
}

impl ExamplesDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ExamplesDir { root: root.into() }
    }
}

#[async_trait]
impl ExampleLocator for ExamplesDir {
    async fn resolve_example_asset(&self, category: &str, name: &str) -> Result<PathBuf, SourceIoError> {
        let path = self.root.join(category).join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(SourceIoError::NotFound {
                category: category.to_string(),
                name: name.to_string(),
            })
        }
    }
}

/// Non-interactive picker; every request is a cancelled pick
#[derive(Debug, Default)]
pub struct NoPicker;

#[async_trait]
impl FilePicker for NoPicker {
    async fn open_file_picker(&self, title: &str) -> Option<PathBuf> {
        debug!("No file picker available for '{}'", title);
        None
    }
}

/// Routes toasts to the console logger
#[derive(Debug, Default)]
pub struct LoggerNotifier;

impl Notifier for LoggerNotifier {
    fn notify_error(&self, message: &str) {
        logger::warn(message);
    }

    fn notify_success(&self, message: &str) {
        logger::success(message);
    }
}

/// Prints the execution request as one JSON line on stdout instead of
/// running the plugin
#[derive(Debug, Default)]
pub struct DryRunExecutor;

#[async_trait]
impl ExecutionSink for DryRunExecutor {
    async fn submit_for_execution(&self, request: &ExecutionRequest) -> Result<JobId, ExecutionError> {
        let line = serde_json::to_string(request).map_err(|e| ExecutionError(e.to_string()))?;
        println!("{}", line);
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
        Ok(JobId(format!("dry-run-{}-{}", request.plugin_id, stamp)))
    }
}

/// Host wired to the filesystem, the examples root and the dry-run executor
pub fn cli_host(examples_root: impl Into<PathBuf>) -> Host {
    Host::new(
        Arc::new(DiskFiles),
        Arc::new(ExamplesDir::new(examples_root)),
        Arc::new(NoPicker),
        Arc::new(LoggerNotifier),
        Arc::new(DryRunExecutor),
    )
}
