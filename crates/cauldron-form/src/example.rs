//! Example population chain
//!
//! Entries are processed in declared order. `<field>_source` entries load a
//! column-selector's headers from an example asset; entries naming a `file`
//! input resolve the asset path and refresh that input's dependents; every
//! other known entry is copied verbatim and unknown keys are ignored.
//! Nothing touches the snapshot until the whole chain has run.

use cauldron_schema::{FieldKind, FieldValue, PluginDefinition};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::errors::ExampleRefError;
use crate::host::Host;
use crate::options::{self, OptionCache};

/// Suffix marking an entry that names a column-selector's header source
pub const SOURCE_SUFFIX: &str = "_source";

/// Most headers a multi-valued column-selector receives from an example
pub const EXAMPLE_COLUMN_LIMIT: usize = 10;

/// Split a `category/filename` reference
pub fn parse_example_ref(reference: &str) -> Result<(&str, &str), ExampleRefError> {
    match reference.split_once('/') {
        Some((category, name)) if !category.is_empty() && !name.is_empty() => Ok((category, name)),
        _ => Err(ExampleRefError(reference.to_string())),
    }
}

/// An example entry that could not be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub key: String,
    pub reason: String,
}

/// Result of running the chain, before it is merged into a snapshot
#[derive(Debug, Clone, Default)]
pub struct ExampleOutcome {
    /// Values to apply as one patch, in the order they were derived
    pub patch: Vec<(String, FieldValue)>,
    pub skipped: Vec<SkippedEntry>,
    /// Fields whose cached options changed while the chain ran
    pub updated_options: Vec<String>,
}

impl ExampleOutcome {
    fn skip(&mut self, host: &Host, key: &str, reason: impl ToString) {
        let reason = reason.to_string();
        warn!("Skipping example entry '{}': {}", key, reason);
        host.notifier
            .notify_error(&format!("Failed to load example value for {key}: {reason}"));
        self.skipped.push(SkippedEntry {
            key: key.to_string(),
            reason,
        });
    }

    fn mark_updated(&mut self, field: &str) {
        if !self.updated_options.iter().any(|f| f == field) {
            self.updated_options.push(field.to_string());
        }
    }
}

async fn locate(host: &Host, value: &FieldValue) -> Result<PathBuf, String> {
    let reference = value.as_str().unwrap_or_default();
    let (category, name) = parse_example_ref(reference).map_err(|e| e.to_string())?;
    host.examples
        .resolve_example_asset(category, name)
        .await
        .map_err(|e| e.to_string())
}

/// Run every example entry of `definition` against `cache`
pub async fn resolve_example(definition: &PluginDefinition, host: &Host, cache: &mut OptionCache) -> ExampleOutcome {
    let mut outcome = ExampleOutcome::default();
    let Some(example) = definition.example.as_ref().filter(|e| e.enabled) else {
        return outcome;
    };

    for (key, value) in example.values.iter() {
        if let Some(target) = key.strip_suffix(SOURCE_SUFFIX) {
            let Some(field) = definition.input(target) else {
                outcome.skip(host, key, format!("unknown field '{target}'"));
                continue;
            };
            if field.kind != FieldKind::ColumnSelector {
                outcome.skip(host, key, format!("'{target}' is not a column selector"));
                continue;
            }

            let path = match locate(host, value).await {
                Ok(path) => path,
                Err(reason) => {
                    outcome.skip(host, key, reason);
                    continue;
                }
            };

            let ticket = cache.begin(target, &path);
            let headers = match options::load_header_options(host.files.as_ref(), &path).await {
                Ok(headers) => headers,
                Err(e) => {
                    cache.commit_header(&ticket, Vec::new());
                    outcome.mark_updated(target);
                    outcome.skip(host, key, e);
                    continue;
                }
            };
            cache.commit_header(&ticket, headers.clone());
            outcome.mark_updated(target);

            if example.values.has_explicit(target) {
                debug!("'{}' has an explicit example value, keeping it", target);
                continue;
            }
            let derived = if field.is_multi_valued() {
                FieldValue::List(headers.into_iter().take(EXAMPLE_COLUMN_LIMIT).collect())
            } else {
                headers.into_iter().next().map_or(FieldValue::Empty, FieldValue::Text)
            };
            outcome.patch.push((target.to_string(), derived));
            continue;
        }

        let Some(field) = definition.input(key) else {
            warn!("Ignoring example value for unknown field '{}'", key);
            continue;
        };

        if field.kind != FieldKind::File || value.is_empty() {
            outcome.patch.push((key.to_string(), value.clone()));
            continue;
        }

        let path = match locate(host, value).await {
            Ok(path) => path,
            Err(reason) => {
                outcome.skip(host, key, reason);
                continue;
            }
        };

        for ticket in options::begin_dependents(definition, cache, key, &path) {
            let refresh = options::refresh_dependent(host.files.as_ref(), cache, &ticket).await;
            outcome.mark_updated(&refresh.field);
            if let Some(e) = refresh.error {
                host.notifier.notify_error(&format!("Failed to load columns: {e}"));
            }
        }
        outcome
            .patch
            .push((key.to_string(), FieldValue::Text(path.to_string_lossy().into_owned())));
    }

    outcome
}
