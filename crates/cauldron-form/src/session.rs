//! One plugin-configuration session
//!
//! [`FormSession`] owns the value snapshot, the option cache, selection
//! cursors and the last validation report for a single plugin. Nothing is
//! shared between sessions; dropping the session discards all of it.

use cauldron_schema::{FieldKind, FieldSpec, FieldValue, Plugin, PluginDefinition};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::{FormError, SourceIoError};
use crate::example::{self, ExampleOutcome};
use crate::host::{ExecutionRequest, Host, JobId};
use crate::normalize::{normalize, NormalizedValues};
use crate::options::{self, DependentRefresh, OptionCache, OptionSet, OptionSource, ResolutionTicket};
use crate::selection::SelectionCursors;
use crate::snapshot::FormSnapshot;
use crate::validation::{self, ValidationReport};
use crate::visibility;

pub const MSG_VALIDATION_FAILED: &str = "Please fix validation errors before submitting";
pub const MSG_EXAMPLE_LOADED: &str = "Example data loaded successfully";
pub const MSG_NO_EXAMPLE: &str = "No example data available for this plugin";
pub const MSG_JOB_CREATED: &str = "Job created successfully!";

/// What changed after a field update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTransition {
    /// Fields whose option lists were re-resolved
    pub updated_options: Vec<String>,
    /// Visibility of every declared input after the change
    pub visibility: BTreeMap<String, bool>,
}

#[derive(Debug)]
pub struct FormSession {
    plugin: Plugin,
    host: Host,
    values: FormSnapshot,
    options: OptionCache,
    cursors: SelectionCursors,
    report: Option<ValidationReport>,
}

impl FormSession {
    /// Build the initial snapshot and resolve static external options.
    /// Source failures are notified; opening never fails.
    pub async fn open(plugin: Plugin, host: Host) -> Self {
        let values = FormSnapshot::from_definition(&plugin.definition);
        let mut session = FormSession {
            plugin,
            host,
            values,
            options: OptionCache::default(),
            cursors: SelectionCursors::default(),
            report: None,
        };
        let resolved = session.resolve_static_external_options().await;
        info!(
            "Opened form for '{}' ({} inputs, {} external option sources)",
            session.plugin.id(),
            session.plugin.definition.inputs.len(),
            resolved.len()
        );
        session
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn plugin(&self) -> &Plugin {
        &self.plugin
    }

    pub fn definition(&self) -> &PluginDefinition {
        &self.plugin.definition
    }

    pub fn values(&self) -> &FormSnapshot {
        &self.values
    }

    pub fn value(&self, name: &str) -> &FieldValue {
        self.values.get(name)
    }

    /// Current candidates for `name`: resolved options if any, otherwise
    /// whatever the schema declares inline
    pub fn options(&self, name: &str) -> OptionSet {
        if let Some(resolved) = self.options.get(name) {
            return resolved.clone();
        }
        self.definition()
            .input(name)
            .map_or_else(OptionSet::empty, |field| OptionSource::of(field).inline_options())
    }

    pub fn option_cache(&self) -> &OptionCache {
        &self.options
    }

    /// Report from the last submit attempt, cleared by any later change
    pub fn report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    pub fn cursor(&self, name: &str) -> Option<usize> {
        self.cursors.cursor(name)
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.definition()
            .input(name)
            .is_some_and(|field| visibility::is_visible(field, &self.values))
    }

    pub fn visibility(&self) -> BTreeMap<String, bool> {
        visibility::evaluate_all(self.definition(), &self.values)
    }

    /// Visible inputs in declared order
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.definition()
            .inputs
            .iter()
            .filter(|field| visibility::is_visible(field, &self.values))
    }

    fn field(&self, name: &str) -> Result<&FieldSpec, FormError> {
        self.definition()
            .input(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    fn transition(&self, updated_options: Vec<String>) -> FieldTransition {
        FieldTransition {
            updated_options,
            visibility: self.visibility(),
        }
    }

    // =========================================================================
    // Option resolution
    // =========================================================================

    /// Read every `optionsFromFile` / `groupsFromFile` source.
    /// Returns the fields that were attempted.
    pub async fn resolve_static_external_options(&mut self) -> Vec<String> {
        let pending: Vec<(String, String, bool, PathBuf)> = self
            .plugin
            .definition
            .inputs
            .iter()
            .filter_map(|field| {
                let (path, grouped) = match OptionSource::of(field) {
                    OptionSource::FlatFile(path) => (path, false),
                    OptionSource::GroupedFile(path) => (path, true),
                    _ => return None,
                };
                Some((
                    field.name.clone(),
                    field.display_label().to_string(),
                    grouped,
                    self.plugin.resolve_path(path),
                ))
            })
            .collect();

        let mut attempted = Vec::with_capacity(pending.len());
        for (name, label, grouped, path) in pending {
            let ticket = self.options.begin(&name, &path);
            let resolved = match options::load_static_options(self.host.files.as_ref(), &path, grouped).await {
                Ok(set) => set,
                Err(e) => {
                    warn!("Option source for '{}' unavailable: {}", name, e);
                    self.host
                        .notifier
                        .notify_error(&format!("Failed to load options for {label}: {e}"));
                    if grouped {
                        OptionSet::Grouped(Vec::new())
                    } else {
                        OptionSet::empty()
                    }
                }
            };
            self.options.commit_static(&ticket, resolved);
            attempted.push(name);
        }
        attempted
    }

    /// Claim the cache slot of every field driven by `source` for a read of
    /// `path`. Pair each ticket with [`FormSession::apply_resolution`].
    pub fn begin_dependents(&mut self, source: &str, path: &Path) -> Vec<ResolutionTicket> {
        options::begin_dependents(&self.plugin.definition, &mut self.options, source, path)
    }

    /// Store the outcome of a header read. A failed read empties the
    /// field's options and is notified. Stale tickets return false and
    /// change nothing.
    pub fn apply_resolution(&mut self, ticket: &ResolutionTicket, result: Result<Vec<String>, SourceIoError>) -> bool {
        let refresh = options::commit_dependent(&mut self.options, ticket, result);
        self.notify_refresh(&refresh);
        refresh.stored
    }

    fn notify_refresh(&self, refresh: &DependentRefresh) {
        if let Some(e) = refresh.error.as_ref().filter(|_| refresh.stored) {
            self.host.notifier.notify_error(&format!("Failed to load columns: {e}"));
        }
    }

    /// Re-read header options for every dependent of `source` from `path`.
    /// Returns the dependents whose options were stored.
    pub async fn resolve_file_dependents(&mut self, source: &str, path: &Path) -> Vec<String> {
        let tickets = self.begin_dependents(source, path);
        let mut updated = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let refresh = options::refresh_dependent(self.host.files.as_ref(), &mut self.options, &ticket).await;
            self.notify_refresh(&refresh);
            if refresh.stored {
                updated.push(refresh.field);
            }
        }
        updated
    }

    /// Empty the options of every dependent of `source`
    fn clear_file_dependents(&mut self, source: &str) -> Vec<String> {
        let tickets = self.begin_dependents(source, Path::new(""));
        tickets
            .into_iter()
            .filter(|ticket| self.options.commit_header(ticket, Vec::new()))
            .map(|ticket| ticket.field)
            .collect()
    }

    // =========================================================================
    // User actions
    // =========================================================================

    /// Set one field. A `file` field drives its dependents' options.
    pub async fn on_field_change(&mut self, name: &str, value: FieldValue) -> Result<FieldTransition, FormError> {
        let kind = self.field(name)?.kind;
        self.values.set(name, value.clone());
        self.report = None;

        let updated = if kind == FieldKind::File {
            match value.as_str().filter(|path| !path.is_empty()) {
                Some(path) => self.resolve_file_dependents(name, Path::new(path)).await,
                None => self.clear_file_dependents(name),
            }
        } else {
            Vec::new()
        };
        debug!("Field '{}' changed, {} dependents refreshed", name, updated.len());
        Ok(self.transition(updated))
    }

    /// Ask the picker for a path for file field `name`. A cancelled pick
    /// leaves the value and every dependent untouched and returns `None`.
    pub async fn open_file(&mut self, name: &str) -> Result<Option<FieldTransition>, FormError> {
        let field = self.field(name)?;
        if field.kind != FieldKind::File {
            return Err(FormError::NotAFileField(name.to_string()));
        }
        let title = format!("Select {}", field.display_label());

        let Some(path) = self.host.picker.open_file_picker(&title).await else {
            debug!("File selection for '{}' cancelled", name);
            return Ok(None);
        };
        let value = FieldValue::Text(path.to_string_lossy().into_owned());
        self.on_field_change(name, value).await.map(Some)
    }

    /// Click (or shift-click) `value` in multi-valued field `name`.
    /// Returns the field's new value.
    pub fn click_option(&mut self, name: &str, value: &str, shift: bool) -> Result<FieldValue, FormError> {
        let field = self.field(name)?;
        if !field.is_multi_valued() {
            return Err(FormError::NotMultiValued(name.to_string()));
        }

        let candidates = self.options(name).values();
        let mut selected = match self.values.get(name) {
            FieldValue::List(items) => items.clone(),
            FieldValue::Text(text) if !text.is_empty() => vec![text.clone()],
            _ => Vec::new(),
        };
        self.cursors.click(name, &candidates, &mut selected, value, shift);

        let updated = FieldValue::List(selected);
        self.values.set(name, updated.clone());
        self.report = None;
        Ok(updated)
    }

    /// Populate the form from the plugin's example
    pub async fn load_example(&mut self) -> ExampleOutcome {
        if !self.definition().example.as_ref().is_some_and(|e| e.enabled) {
            self.host.notifier.notify_error(MSG_NO_EXAMPLE);
            return ExampleOutcome::default();
        }

        let outcome = example::resolve_example(&self.plugin.definition, &self.host, &mut self.options).await;
        let written = self.values.patch(outcome.patch.iter().cloned());
        self.report = None;
        info!(
            "Loaded example for '{}': {} values, {} skipped",
            self.plugin.id(),
            written.len(),
            outcome.skipped.len()
        );

        if outcome.skipped.is_empty() {
            self.host.notifier.notify_success(MSG_EXAMPLE_LOADED);
        }
        outcome
    }

    /// Run a full validation pass and keep the report
    pub fn validate(&mut self) -> &ValidationReport {
        let report = validation::validate(&self.plugin.definition, &self.values);
        self.report.insert(report)
    }

    pub fn normalized_values(&self) -> NormalizedValues {
        normalize(&self.values)
    }

    pub fn execution_request(&self) -> ExecutionRequest {
        ExecutionRequest {
            plugin_id: self.plugin.id().to_string(),
            parameters: self.normalized_values(),
        }
    }

    /// Validate, then hand the normalized values to the executor.
    /// On any failure the snapshot and options are left as they were.
    pub async fn submit(&mut self) -> Result<JobId, FormError> {
        let report = self.validate().clone();
        if !report.is_empty() {
            warn!("Submission of '{}' refused: {} violations", self.plugin.id(), report.len());
            self.host.notifier.notify_error(MSG_VALIDATION_FAILED);
            return Err(FormError::Validation(report));
        }

        let request = self.execution_request();
        match self.host.executor.submit_for_execution(&request).await {
            Ok(job) => {
                info!("Submitted '{}' as job {}", request.plugin_id, job);
                self.host.notifier.notify_success(MSG_JOB_CREATED);
                Ok(job)
            }
            Err(e) => {
                warn!("Execution of '{}' failed: {}", request.plugin_id, e);
                self.host.notifier.notify_error(&e.0);
                Err(FormError::Execution(e))
            }
        }
    }

    /// Restore defaults and drop everything derived from chosen files
    pub fn reset(&mut self) {
        self.values = FormSnapshot::from_definition(&self.plugin.definition);
        self.options.clear_header_derived();
        self.cursors.clear();
        self.report = None;
        debug!("Reset form for '{}'", self.plugin.id());
    }
}
