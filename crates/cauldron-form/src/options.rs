//! Option resolution
//!
//! Each field kind maps to exactly one [`OptionSource`]. Static external
//! sources (flat option files, grouped option files) are read once when a
//! session opens. Header-derived sources (`column-selector` with
//! `sourceFile`) are read when the driving file field receives a path.
//!
//! Cache writes go through [`ResolutionTicket`]s. Every `begin` bumps the
//! field's generation and invalidates its slot; a `commit` whose ticket is
//! older than the field's latest generation is discarded, so the most
//! recently *requested* resolution wins regardless of completion order.

use cauldron_schema::{FieldGroup, FieldKind, FieldSpec, PluginDefinition};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::SourceIoError;
use crate::host::FileSource;

// =============================================================================
// OPTION SOURCE - One variant per way a field obtains its candidates
// =============================================================================

/// Where a field's candidate list comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionSource<'a> {
    /// Options declared inline in the schema
    Inline(&'a [String]),
    /// Newline-separated option file, relative to the plugin folder
    FlatFile(&'a str),
    /// Groups declared inline in the schema
    InlineGroups(&'a [FieldGroup]),
    /// JSON group file, relative to the plugin folder
    GroupedFile(&'a str),
    /// Header row of the file chosen in another field
    FileHeader { source_field: &'a str },
    /// Field kind has no candidate list
    NoOptions,
}

impl<'a> OptionSource<'a> {
    pub fn of(field: &'a FieldSpec) -> Self {
        match field.kind {
            FieldKind::Select | FieldKind::Multiselect => match non_empty(field.options_from_file.as_deref()) {
                Some(path) => OptionSource::FlatFile(path),
                None => OptionSource::Inline(&field.options),
            },
            FieldKind::MultiselectGrouped => match non_empty(field.groups_from_file.as_deref()) {
                Some(path) => OptionSource::GroupedFile(path),
                None => OptionSource::InlineGroups(&field.groups),
            },
            FieldKind::ColumnSelector => match non_empty(field.source_file.as_deref()) {
                Some(source_field) => OptionSource::FileHeader { source_field },
                None => OptionSource::Inline(&field.options),
            },
            FieldKind::Text | FieldKind::Number | FieldKind::Boolean | FieldKind::File => {
                OptionSource::NoOptions
            }
        }
    }

    /// Options available without any I/O
    pub fn inline_options(&self) -> OptionSet {
        match self {
            OptionSource::Inline(options) => OptionSet::Flat(options.to_vec()),
            OptionSource::InlineGroups(groups) => OptionSet::Grouped(groups.to_vec()),
            _ => OptionSet::empty(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

// =============================================================================
// OPTION SET - Resolved candidates
// =============================================================================

/// Resolved candidates for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionSet {
    Flat(Vec<String>),
    Grouped(Vec<FieldGroup>),
}

impl OptionSet {
    pub fn empty() -> Self {
        OptionSet::Flat(Vec::new())
    }

    /// Option values in declared order; groups are flattened in group order
    pub fn values(&self) -> Vec<String> {
        match self {
            OptionSet::Flat(values) => values.clone(),
            OptionSet::Grouped(groups) => groups
                .iter()
                .flat_map(|group| group.options.iter().map(|option| option.value.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            OptionSet::Flat(values) => values.is_empty(),
            OptionSet::Grouped(groups) => groups.iter().all(|group| group.options.is_empty()),
        }
    }
}

// =============================================================================
// PARSERS - Pure text to candidates
// =============================================================================

/// Tab-split, trimmed header tokens of a file's first line
pub fn parse_header_line(line: &str) -> Vec<String> {
    if line.trim().is_empty() {
        return Vec::new();
    }
    line.split('\t').map(|token| token.trim().to_string()).collect()
}

/// One option per non-blank line
pub fn parse_flat_options(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Grouped options: either `{"group": [options]}` (ordered by group name)
/// or `[{"name": "group", "options": [...]}]` (declared order)
pub fn parse_groups(text: &str, path: &Path) -> Result<Vec<FieldGroup>, SourceIoError> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum GroupFile {
        Listed(Vec<FieldGroup>),
        Keyed(BTreeMap<String, Vec<cauldron_schema::FieldOption>>),
    }

    let parsed: GroupFile =
        serde_json::from_str(text).map_err(|e| SourceIoError::malformed(path, e))?;
    Ok(match parsed {
        GroupFile::Listed(groups) => groups,
        GroupFile::Keyed(map) => map
            .into_iter()
            .map(|(name, options)| FieldGroup { name, options })
            .collect(),
    })
}

/// Read the header row of `path` through the file collaborator
pub async fn load_header_options(files: &dyn FileSource, path: &Path) -> Result<Vec<String>, SourceIoError> {
    let line = files.read_first_line(path).await?;
    Ok(parse_header_line(&line))
}

/// Read a static external option source from `resolved`, already joined
/// onto the plugin folder. `grouped` selects the JSON group format.
pub async fn load_static_options(files: &dyn FileSource, resolved: &Path, grouped: bool) -> Result<OptionSet, SourceIoError> {
    let text = files.read_file_text(resolved).await?;
    if grouped {
        parse_groups(&text, resolved).map(OptionSet::Grouped)
    } else {
        Ok(OptionSet::Flat(parse_flat_options(&text)))
    }
}

// =============================================================================
// OPTION CACHE - Per-session, generation-tagged
// =============================================================================

/// What produced a cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionOrigin {
    Static(PathBuf),
    Header(PathBuf),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    options: OptionSet,
    origin: OptionOrigin,
}

/// Claim on one field's cache slot, issued by [`OptionCache::begin`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionTicket {
    pub field: String,
    pub path: PathBuf,
    generation: u64,
}

impl ResolutionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Field name to resolved candidates, owned by one session
#[derive(Debug, Clone, Default)]
pub struct OptionCache {
    entries: BTreeMap<String, CacheEntry>,
    generations: BTreeMap<String, u64>,
}

impl OptionCache {
    /// Start a resolution of `field` from `path`. The slot is invalidated
    /// immediately so nothing reads the previous source's options.
    pub fn begin(&mut self, field: &str, path: impl Into<PathBuf>) -> ResolutionTicket {
        let generation = self.generations.entry(field.to_string()).or_insert(0);
        *generation += 1;
        self.entries.remove(field);
        ResolutionTicket {
            field: field.to_string(),
            path: path.into(),
            generation: *generation,
        }
    }

    /// Store header-derived options. Returns false when a newer ticket exists.
    pub fn commit_header(&mut self, ticket: &ResolutionTicket, options: Vec<String>) -> bool {
        let origin = OptionOrigin::Header(ticket.path.clone());
        self.commit(ticket, OptionSet::Flat(options), origin)
    }

    /// Store statically sourced options. Returns false when a newer ticket exists.
    pub fn commit_static(&mut self, ticket: &ResolutionTicket, options: OptionSet) -> bool {
        let origin = OptionOrigin::Static(ticket.path.clone());
        self.commit(ticket, options, origin)
    }

    fn commit(&mut self, ticket: &ResolutionTicket, options: OptionSet, origin: OptionOrigin) -> bool {
        let latest = self.generations.get(&ticket.field).copied().unwrap_or(0);
        if ticket.generation != latest {
            debug!(
                "Discarding stale options for '{}' (generation {} < {})",
                ticket.field, ticket.generation, latest
            );
            return false;
        }
        self.entries
            .insert(ticket.field.clone(), CacheEntry { options, origin });
        true
    }

    pub fn get(&self, field: &str) -> Option<&OptionSet> {
        self.entries.get(field).map(|entry| &entry.options)
    }

    pub fn origin(&self, field: &str) -> Option<&OptionOrigin> {
        self.entries.get(field).map(|entry| &entry.origin)
    }

    /// Drop every header-derived entry, keeping static sources.
    /// Every ticket not backed by a stored static entry becomes stale,
    /// including header reads still in flight.
    pub fn clear_header_derived(&mut self) {
        let stale: Vec<String> = self
            .generations
            .keys()
            .filter(|field| !matches!(self.origin(field), Some(OptionOrigin::Static(_))))
            .cloned()
            .collect();
        for field in stale {
            self.entries.remove(&field);
            if let Some(generation) = self.generations.get_mut(&field) {
                *generation += 1;
            }
        }
    }
}

/// Outcome of re-reading one dependent's header options
#[derive(Debug)]
pub struct DependentRefresh {
    pub field: String,
    /// False when a newer ticket claimed the slot first
    pub stored: bool,
    pub error: Option<SourceIoError>,
}

/// Claim the slot of every field whose `sourceFile` is `source`
pub fn begin_dependents(
    definition: &PluginDefinition,
    cache: &mut OptionCache,
    source: &str,
    path: &Path,
) -> Vec<ResolutionTicket> {
    definition
        .dependents_of(source)
        .map(|dependent| cache.begin(&dependent.name, path))
        .collect()
}

/// Read the header row for `ticket` and store it. A failed read stores
/// no options and reports the error.
pub async fn refresh_dependent(files: &dyn FileSource, cache: &mut OptionCache, ticket: &ResolutionTicket) -> DependentRefresh {
    let result = load_header_options(files, &ticket.path).await;
    commit_dependent(cache, ticket, result)
}

/// Store an already completed header read for `ticket`
pub fn commit_dependent(
    cache: &mut OptionCache,
    ticket: &ResolutionTicket,
    result: Result<Vec<String>, SourceIoError>,
) -> DependentRefresh {
    let (headers, error) = match result {
        Ok(headers) => (headers, None),
        Err(e) => {
            warn!("Header read for '{}' failed: {}", ticket.field, e);
            (Vec::new(), Some(e))
        }
    };
    DependentRefresh {
        field: ticket.field.clone(),
        stored: cache.commit_header(ticket, headers),
        error,
    }
}
