use cauldron_schema::{FieldValue, PluginDefinition};
use serde::Serialize;
use std::collections::BTreeMap;

static EMPTY: FieldValue = FieldValue::Empty;

/// Field name to current value, with exactly one entry per declared input
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormSnapshot {
    values: BTreeMap<String, FieldValue>,
}

impl FormSnapshot {
    /// Seed a snapshot from each input's default or type-appropriate empty value
    pub fn from_definition(definition: &PluginDefinition) -> Self {
        let values = definition
            .inputs
            .iter()
            .map(|input| (input.name.clone(), input.initial_value()))
            .collect();
        FormSnapshot { values }
    }

    /// Current value of `name`; unknown names read as empty
    pub fn get(&self, name: &str) -> &FieldValue {
        self.values.get(name).unwrap_or(&EMPTY)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Replace the value of an existing key. Returns false for unknown names.
    pub fn set(&mut self, name: &str, value: FieldValue) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Apply several values at once, skipping unknown names.
    /// Returns the names that were written.
    pub fn patch<I>(&mut self, entries: I) -> Vec<String>
    where
        I: IntoIterator<Item = (String, FieldValue)>,
    {
        let mut written = Vec::new();
        for (name, value) in entries {
            if self.set(&name, value) {
                written.push(name);
            }
        }
        written
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for FormSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        FormSnapshot {
            values: iter.into_iter().collect(),
        }
    }
}
