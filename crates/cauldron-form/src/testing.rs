//! In-memory collaborators for engine tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{ExecutionError, SourceIoError};
use crate::host::{ExampleLocator, ExecutionRequest, ExecutionSink, FilePicker, FileSource, Host, JobId, Notifier};

#[derive(Debug, Default)]
pub struct MemoryFiles {
    files: Mutex<BTreeMap<PathBuf, String>>,
    reads: Mutex<Vec<PathBuf>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        MemoryFiles::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files.lock().insert(path.into(), content.to_string());
        self
    }

    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().clone()
    }

    fn lookup(&self, path: &Path) -> Result<String, SourceIoError> {
        self.reads.lock().push(path.to_path_buf());
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| SourceIoError::unreadable(path, "No such file or directory"))
    }
}

#[async_trait]
impl FileSource for MemoryFiles {
    async fn read_file_text(&self, path: &Path) -> Result<String, SourceIoError> {
        self.lookup(path)
    }

    async fn read_first_line(&self, path: &Path) -> Result<String, SourceIoError> {
        let text = self.lookup(path)?;
        Ok(text.lines().next().unwrap_or_default().to_string())
    }
}

/// Resolves `category/name` to `<root>/<category>/<name>` for registered assets
#[derive(Debug)]
pub struct MapLocator {
    root: PathBuf,
    known: Vec<(String, String)>,
}

impl MapLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MapLocator {
            root: root.into(),
            known: Vec::new(),
        }
    }

    pub fn with_asset(mut self, category: &str, name: &str) -> Self {
        self.known.push((category.to_string(), name.to_string()));
        self
    }
}

#[async_trait]
impl ExampleLocator for MapLocator {
    async fn resolve_example_asset(&self, category: &str, name: &str) -> Result<PathBuf, SourceIoError> {
        if self.known.iter().any(|(c, n)| c == category && n == name) {
            Ok(self.root.join(category).join(name))
        } else {
            Err(SourceIoError::NotFound {
                category: category.to_string(),
                name: name.to_string(),
            })
        }
    }
}

/// Returns queued answers; an empty queue behaves as a cancelled pick
#[derive(Debug, Default)]
pub struct ScriptedPicker {
    answers: Mutex<VecDeque<Option<PathBuf>>>,
    titles: Mutex<Vec<String>>,
}

impl ScriptedPicker {
    pub fn answer(&self, path: Option<&str>) {
        self.answers.lock().push_back(path.map(PathBuf::from));
    }

    pub fn titles(&self) -> Vec<String> {
        self.titles.lock().clone()
    }
}

#[async_trait]
impl FilePicker for ScriptedPicker {
    async fn open_file_picker(&self, title: &str) -> Option<PathBuf> {
        self.titles.lock().push(title.to_string());
        self.answers.lock().pop_front().flatten()
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    errors: Mutex<Vec<String>>,
    successes: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }

    fn notify_success(&self, message: &str) {
        self.successes.lock().push(message.to_string());
    }
}

#[derive(Debug, Default)]
pub struct RecordingExecutor {
    requests: Mutex<Vec<ExecutionRequest>>,
    failure: Mutex<Option<String>>,
}

impl RecordingExecutor {
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.to_string());
    }

    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ExecutionSink for RecordingExecutor {
    async fn submit_for_execution(&self, request: &ExecutionRequest) -> Result<JobId, ExecutionError> {
        if let Some(message) = self.failure.lock().clone() {
            return Err(ExecutionError(message));
        }
        let mut requests = self.requests.lock();
        requests.push(request.clone());
        Ok(JobId(format!("job-{}", requests.len())))
    }
}

/// Every fake wired into one [`Host`], with handles kept for assertions
pub struct TestHost {
    pub files: Arc<MemoryFiles>,
    pub picker: Arc<ScriptedPicker>,
    pub notifier: Arc<RecordingNotifier>,
    pub executor: Arc<RecordingExecutor>,
    pub host: Host,
}

impl TestHost {
    pub fn new(files: MemoryFiles, locator: MapLocator) -> Self {
        let files = Arc::new(files);
        let picker = Arc::new(ScriptedPicker::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let executor = Arc::new(RecordingExecutor::default());
        let host = Host::new(
            files.clone(),
            Arc::new(locator),
            picker.clone(),
            notifier.clone(),
            executor.clone(),
        );
        TestHost {
            files,
            picker,
            notifier,
            executor,
            host,
        }
    }
}
