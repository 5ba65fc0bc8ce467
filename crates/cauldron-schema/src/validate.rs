//! Structural checks on a plugin definition
//!
//! `validate` rejects definitions that cannot be run at all. `lint` reports
//! references that only degrade a form (a dangling `sourceFile` resolves to
//! "no options" at runtime) so loading still succeeds.

use std::collections::HashSet;

use crate::errors::SchemaError;
use crate::types::{FieldKind, PluginDefinition, RuntimeKind};

const EXAMPLE_SOURCE_SUFFIX: &str = "_source";

impl PluginDefinition {
    /// Check the definition, returning the first problem found
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.plugin.id.is_empty() {
            return Err(invalid("plugin ID is required"));
        }
        if self.plugin.name.is_empty() {
            return Err(invalid("plugin name is required"));
        }
        if self.runtime.kind.is_empty() {
            return Err(invalid("runtime type is required"));
        }
        if self.runtime.script.is_empty() {
            return Err(invalid("runtime script is required"));
        }
        if RuntimeKind::parse(&self.runtime.kind).is_none() {
            return Err(invalid(&format!("invalid runtime type: {}", self.runtime.kind)));
        }

        let mut input_names = HashSet::new();
        for input in &self.inputs {
            if input.name.is_empty() {
                return Err(invalid("input name is required"));
            }
            if !input_names.insert(input.name.as_str()) {
                return Err(invalid(&format!("duplicate input name: {}", input.name)));
            }
        }

        let mut output_names = HashSet::new();
        for output in &self.outputs {
            if output.name.is_empty() {
                return Err(invalid("output name is required"));
            }
            if !output_names.insert(output.name.as_str()) {
                return Err(invalid(&format!("duplicate output name: {}", output.name)));
            }
            if output.path.is_empty() {
                return Err(invalid(&format!("output path is required for: {}", output.name)));
            }
        }

        for plot in &self.plots {
            if plot.id.is_empty() {
                return Err(invalid("plot ID is required"));
            }
            if plot.data_source.is_empty() {
                return Err(invalid(&format!("plot data source is required for: {}", plot.id)));
            }
            if !output_names.contains(plot.data_source.as_str()) {
                return Err(invalid(&format!(
                    "plot {} references non-existent output: {}",
                    plot.id, plot.data_source
                )));
            }
        }

        Ok(())
    }

    /// Non-fatal reference problems, one message per finding
    pub fn lint(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for input in &self.inputs {
            if let Some(source) = &input.source_file {
                match self.input(source) {
                    None => warnings.push(format!(
                        "input '{}' has sourceFile '{}' which is not a declared input",
                        input.name, source
                    )),
                    Some(target) if target.kind != FieldKind::File => warnings.push(format!(
                        "input '{}' has sourceFile '{}' which is not a file input",
                        input.name, source
                    )),
                    Some(_) => {}
                }
            }

            if let Some(condition) = &input.visible_when {
                if self.input(&condition.field).is_none() {
                    warnings.push(format!(
                        "input '{}' is visible when '{}' matches, but no such input exists",
                        input.name, condition.field
                    ));
                }
            }

            if input.kind == FieldKind::Number {
                if let (Some(min), Some(max)) = (input.min, input.max) {
                    if min > max {
                        warnings.push(format!(
                            "input '{}' has min {} greater than max {}",
                            input.name, min, max
                        ));
                    }
                }
            }
        }

        if let Some(example) = &self.example {
            for (key, _) in example.values.iter() {
                if let Some(target) = key.strip_suffix(EXAMPLE_SOURCE_SUFFIX) {
                    let is_column_selector = self
                        .input(target)
                        .is_some_and(|input| input.kind == FieldKind::ColumnSelector);
                    if !is_column_selector {
                        warnings.push(format!(
                            "example key '{}' does not name a column-selector input",
                            key
                        ));
                    }
                } else if self.input(key).is_none() {
                    warnings.push(format!("example key '{}' does not name an input", key));
                }
            }
        }

        warnings
    }
}

fn invalid(message: &str) -> SchemaError {
    SchemaError::Invalid(message.to_string())
}
