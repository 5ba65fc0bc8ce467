use cauldron_schema::{FieldKind, PluginDefinition};
use serde::Serialize;
use std::fmt;

use crate::snapshot::FormSnapshot;
use crate::visibility::is_visible;

/// Ordered violation messages from one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    messages: Vec<String>,
}

impl ValidationReport {
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    fn push(&mut self, message: String) {
        self.messages.push(message);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join("\n"))
    }
}

/// Check required and numeric bound constraints over visible fields.
/// Hidden fields are never reported. Bounds are inclusive.
pub fn validate(definition: &PluginDefinition, values: &FormSnapshot) -> ValidationReport {
    let mut report = ValidationReport::default();

    for field in definition.inputs.iter().filter(|f| is_visible(f, values)) {
        let label = field.display_label();
        let value = values.get(&field.name);

        if field.required && value.is_empty() {
            report.push(format!("{label} is required"));
        }

        if field.kind != FieldKind::Number {
            continue;
        }
        let Some(number) = value.as_f64() else {
            continue;
        };
        if let Some(min) = field.min {
            if number < min {
                report.push(format!("{label} must be at least {min}"));
            }
        }
        if let Some(max) = field.max {
            if number > max {
                report.push(format!("{label} must be at most {max}"));
            }
        }
    }

    report
}
