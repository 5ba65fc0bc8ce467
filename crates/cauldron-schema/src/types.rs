//! Plugin definition types
//!
//! These mirror the `plugin.yaml` layout one-to-one. Field names are camelCase
//! on disk (`sourceFile`, `visibleWhen`, `optionsFromFile`, ...).

use ahash::AHashMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::value::FieldValue;

// =============================================================================
// PLUGIN - A loaded definition plus where it lives on disk
// =============================================================================

/// A plugin definition together with its folder and resolved script path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub definition: PluginDefinition,
    pub folder_path: PathBuf,
    pub script_path: PathBuf,
}

impl Plugin {
    pub fn id(&self) -> &str {
        &self.definition.plugin.id
    }

    /// Resolve a path declared in the definition against the plugin folder.
    /// Absolute paths are returned unchanged.
    pub fn resolve_path(&self, declared: &str) -> PathBuf {
        let path = Path::new(declared);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.folder_path.join(path)
        }
    }
}

// =============================================================================
// DEFINITION - Top-level with index for O(1) input lookup
// =============================================================================

/// Top-level structure of a `plugin.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDefinition {
    pub plugin: PluginMetadata,
    pub runtime: PluginRuntime,
    #[serde(default)]
    pub inputs: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<PluginOutput>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plots: Vec<PluginPlot>,
    #[serde(default)]
    pub execution: PluginExecution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<ExampleData>,

    /// Runtime only - rebuilt on load for O(1) input lookup
    #[serde(skip)]
    pub input_index: AHashMap<String, usize>,
}

impl PluginDefinition {
    /// Parse a definition from YAML (JSON is accepted as well) and build its index
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        let mut definition: PluginDefinition = serde_yaml::from_str(content)?;
        definition.rebuild_index();
        Ok(definition)
    }

    /// Rebuild the input index after deserialization or mutation
    pub fn rebuild_index(&mut self) {
        self.input_index.clear();
        for (idx, input) in self.inputs.iter().enumerate() {
            self.input_index.entry(input.name.clone()).or_insert(idx);
        }
    }

    /// Look up an input by name
    pub fn input(&self, name: &str) -> Option<&FieldSpec> {
        self.input_index
            .get(name)
            .and_then(|&idx| self.inputs.get(idx))
            .filter(|input| input.name == name)
            .or_else(|| self.inputs.iter().find(|input| input.name == name))
    }

    /// Every input whose options are driven by the file chosen in `source`
    pub fn dependents_of<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a FieldSpec> + 'a {
        self.inputs
            .iter()
            .filter(move |input| input.source_file.as_deref() == Some(source))
    }
}

/// Descriptive plugin metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginMetadata {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub category: PluginCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Menu category a plugin is listed under
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PluginCategory {
    Analysis,
    Utilities,
    Preprocessing,
    Visualization,
    #[default]
    #[serde(other)]
    Uncategorized,
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluginCategory::Analysis => "analysis",
            PluginCategory::Utilities => "utilities",
            PluginCategory::Preprocessing => "preprocessing",
            PluginCategory::Visualization => "visualization",
            PluginCategory::Uncategorized => "uncategorized",
        };
        f.write_str(name)
    }
}

/// Interpreter and entry script of a plugin.
/// `kind` stays a string so an unknown runtime is reported by validation
/// rather than by the YAML parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginRuntime {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub script: String,
}

impl PluginRuntime {
    pub fn runtime_kind(&self) -> Option<RuntimeKind> {
        RuntimeKind::parse(&self.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeKind {
    Python,
    R,
    PythonWithR,
    Direct,
}

impl RuntimeKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "python" => Some(RuntimeKind::Python),
            "r" => Some(RuntimeKind::R),
            "pythonWithR" => Some(RuntimeKind::PythonWithR),
            "direct" => Some(RuntimeKind::Direct),
            _ => None,
        }
    }
}

// =============================================================================
// FIELD SPEC - One declared input
// =============================================================================

/// Field kind enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    File,
    Select,
    Multiselect,
    MultiselectGrouped,
    ColumnSelector,
}

/// Declarative description of one plugin input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_from_file: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<FieldGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups_from_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// File filter hint for the picker, e.g. `.txt,.tsv`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(default)]
    pub multiple: bool,
    /// Name of the `file` input whose chosen path drives this field's options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<VisibilityCondition>,
}

impl FieldSpec {
    /// Minimal field with every optional attribute unset
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        FieldSpec {
            label: name.clone(),
            name,
            kind,
            required: false,
            default: None,
            options: Vec::new(),
            options_from_file: None,
            groups: Vec::new(),
            groups_from_file: None,
            description: None,
            placeholder: None,
            accept: None,
            multiple: false,
            source_file: None,
            min: None,
            max: None,
            step: None,
            visible_when: None,
        }
    }

    /// Label used in user-facing messages, falling back to the name
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }

    /// Whether the field holds a list of selections rather than a scalar
    pub fn is_multi_valued(&self) -> bool {
        self.multiple || matches!(self.kind, FieldKind::Multiselect | FieldKind::MultiselectGrouped)
    }

    /// Value a fresh form starts with: the declared default, otherwise a
    /// type-appropriate empty value.
    pub fn initial_value(&self) -> FieldValue {
        if let Some(default) = &self.default {
            if *default != FieldValue::Empty {
                return default.clone();
            }
        }

        if self.is_multi_valued() {
            return FieldValue::List(Vec::new());
        }

        match self.kind {
            FieldKind::Boolean => FieldValue::Bool(false),
            FieldKind::Number => FieldValue::Number(self.min.unwrap_or(0.0)),
            _ => FieldValue::Text(String::new()),
        }
    }
}

/// Show/hide predicate: `{field, equals?, equalsAny?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityCondition {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub equals_any: SmallVec<[FieldValue; 4]>,
}

/// Selectable option with a display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOption")]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        FieldOption {
            label: value.clone(),
            value,
        }
    }
}

/// Option sources accept either a bare string or `{value, label}`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Bare(String),
    Full {
        value: String,
        #[serde(default)]
        label: Option<String>,
    },
}

impl From<RawOption> for FieldOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Bare(value) => FieldOption::new(value),
            RawOption::Full { value, label } => match label {
                Some(label) if !label.is_empty() => FieldOption { value, label },
                _ => FieldOption::new(value),
            },
        }
    }
}

/// Named group of options for `multiselect-grouped` fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGroup {
    pub name: String,
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

// =============================================================================
// OUTPUTS, PLOTS, EXECUTION - Carried for validation and the host
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginOutput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginPlot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub data_source: String,
}

/// How the host maps values onto script arguments. Opaque to the form engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginExecution {
    #[serde(default)]
    pub args_mapping: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub output_dir: String,
    #[serde(default)]
    pub requirements: Requirements,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
}

// =============================================================================
// EXAMPLE DATA - Ordered value map
// =============================================================================

/// Declarative example used to auto-populate a form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExampleData {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub values: ExampleValues,
}

/// Example entries in the order they were written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExampleValues(Vec<(String, FieldValue)>);

impl ExampleValues {
    pub fn new(entries: Vec<(String, FieldValue)>) -> Self {
        ExampleValues(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether `key` carries a non-empty value of its own
    pub fn has_explicit(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ExampleValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ExampleValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = ExampleValues;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of example values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, FieldValue>()? {
                    entries.push((key, value));
                }
                Ok(ExampleValues(entries))
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(ExampleValues::default())
            }
        }

        deserializer.deserialize_any(OrderedVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PCA_YAML: &str = r#"
plugin:
  id: pca
  name: PCA Analysis
  category: analysis
runtime:
  type: python
  script: pca.py
inputs:
  - name: input_file
    label: Input File
    type: file
    required: true
  - name: columns
    label: Sample Columns
    type: column-selector
    sourceFile: input_file
    multiple: true
  - name: n_components
    label: Components
    type: number
    min: 2
    max: 10
  - name: log2
    label: Log2 Transform
    type: boolean
  - name: method
    label: Method
    type: select
    options: [svd, eigen]
    default: svd
example:
  enabled: true
  values:
    input_file: diann/imputed.data.txt
    columns_source: diann/imputed.data.txt
    n_components: 3
"#;

    #[test]
    fn test_parse_definition_and_index() {
        let Ok(def) = PluginDefinition::from_yaml_str(PCA_YAML) else {
            assert!(false, "definition should parse");
            return;
        };
        assert_eq!(def.plugin.id, "pca");
        assert_eq!(def.plugin.category, PluginCategory::Analysis);
        assert_eq!(def.runtime.runtime_kind(), Some(RuntimeKind::Python));
        assert_eq!(def.inputs.len(), 5);
        assert!(def.input("columns").is_some_and(|c| c.kind == FieldKind::ColumnSelector));
        assert!(def.input("missing").is_none());

        let dependents: Vec<&str> = def.dependents_of("input_file").map(|i| i.name.as_str()).collect();
        assert_eq!(dependents, vec!["columns"]);
    }

    #[test]
    fn test_example_values_keep_declared_order() {
        let Ok(def) = PluginDefinition::from_yaml_str(PCA_YAML) else {
            assert!(false, "definition should parse");
            return;
        };
        let Some(example) = def.example else {
            assert!(false, "example should be present");
            return;
        };
        let keys: Vec<&str> = example.values.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["input_file", "columns_source", "n_components"]);
        assert!(example.values.has_explicit("n_components"));
        assert!(!example.values.has_explicit("columns"));
    }

    #[test]
    fn test_initial_values_by_kind() {
        let Ok(def) = PluginDefinition::from_yaml_str(PCA_YAML) else {
            assert!(false, "definition should parse");
            return;
        };
        let initial = |name: &str| def.input(name).map(FieldSpec::initial_value);
        assert_eq!(initial("input_file"), Some(FieldValue::text("")));
        assert_eq!(initial("columns"), Some(FieldValue::List(Vec::new())));
        assert_eq!(initial("n_components"), Some(FieldValue::Number(2.0)));
        assert_eq!(initial("log2"), Some(FieldValue::Bool(false)));
        assert_eq!(initial("method"), Some(FieldValue::text("svd")));
    }

    #[test]
    fn test_unknown_category_is_uncategorized() {
        let yaml = "plugin: {id: x, name: X, category: experimental}\nruntime: {type: r, script: x.R}\n";
        let def = PluginDefinition::from_yaml_str(yaml);
        assert!(def.is_ok_and(|d| d.plugin.category == PluginCategory::Uncategorized));
    }

    #[test]
    fn test_option_accepts_bare_string_and_label() {
        let parsed: Result<Vec<FieldOption>, _> =
            serde_json::from_str(r#"["Reactome", {"value": "GO:0001", "label": "Go term"}, {"value": "v"}]"#);
        let Ok(options) = parsed else {
            assert!(false, "options should parse");
            return;
        };
        assert_eq!(options[0], FieldOption::new("Reactome"));
        assert_eq!(options[1].label, "Go term");
        assert_eq!(options[2].label, "v");
    }

    #[test]
    fn test_resolve_path_against_folder() {
        let Ok(definition) = PluginDefinition::from_yaml_str(PCA_YAML) else {
            assert!(false, "definition should parse");
            return;
        };
        let plugin = Plugin {
            definition,
            folder_path: PathBuf::from("/plugins/pca"),
            script_path: PathBuf::from("/plugins/pca/pca.py"),
        };
        assert_eq!(plugin.resolve_path("options/methods.txt"), PathBuf::from("/plugins/pca/options/methods.txt"));
        assert_eq!(plugin.resolve_path("/abs/list.txt"), PathBuf::from("/abs/list.txt"));
    }
}
