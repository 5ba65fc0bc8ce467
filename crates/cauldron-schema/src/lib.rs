//! Cauldron plugin schema
//!
//! The declarative description of a plugin: its metadata, runtime, the inputs
//! a form collects, the outputs it produces, and an optional example value map.
//!
//! Definitions are authored as `plugin.yaml` files inside a plugin folder and
//! are immutable once loaded. All per-session state lives in `cauldron-form`.

pub mod errors;
pub mod loader;
pub mod types;
pub mod validate;
pub mod value;

pub use errors::SchemaError;
pub use loader::{definition_path, discover_plugins, load_plugin, read_definition};
pub use types::{
    ExampleData, ExampleValues, FieldGroup, FieldKind, FieldOption, FieldSpec, Plugin,
    PluginCategory, PluginDefinition, PluginExecution, PluginMetadata, PluginOutput, PluginPlot,
    PluginRuntime, Requirements, RuntimeKind, VisibilityCondition,
};
pub use value::FieldValue;
