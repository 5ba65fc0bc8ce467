use cauldron_schema::{FieldSpec, PluginDefinition, VisibilityCondition};
use std::collections::BTreeMap;

use crate::snapshot::FormSnapshot;

/// Whether `field` is shown given the current values.
///
/// `equals` takes precedence over `equalsAny`; a condition carrying neither
/// leaves the field visible.
pub fn is_visible(field: &FieldSpec, values: &FormSnapshot) -> bool {
    field
        .visible_when
        .as_ref()
        .map_or(true, |condition| condition_holds(condition, values))
}

fn condition_holds(condition: &VisibilityCondition, values: &FormSnapshot) -> bool {
    let current = values.get(&condition.field);
    if let Some(expected) = &condition.equals {
        return current == expected;
    }
    if condition.equals_any.is_empty() {
        return true;
    }
    condition.equals_any.iter().any(|candidate| candidate == current)
}

/// Visibility of every declared input
pub fn evaluate_all(definition: &PluginDefinition, values: &FormSnapshot) -> BTreeMap<String, bool> {
    definition
        .inputs
        .iter()
        .map(|input| (input.name.clone(), is_visible(input, values)))
        .collect()
}
