use cauldron_schema::FieldValue;
use std::collections::BTreeMap;

use crate::snapshot::FormSnapshot;

/// Submission payload: only keys carrying a real value
pub type NormalizedValues = BTreeMap<String, FieldValue>;

/// Drop null, empty-string and empty-list entries. `false` and `0` survive;
/// an absent key tells the script to use its own default.
pub fn normalize(values: &FormSnapshot) -> NormalizedValues {
    values
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_empty_values() {
        let snapshot: FormSnapshot = [
            ("a".to_string(), FieldValue::text("")),
            ("b".to_string(), FieldValue::Empty),
            ("c".to_string(), FieldValue::Bool(false)),
            ("d".to_string(), FieldValue::List(Vec::new())),
            ("e".to_string(), FieldValue::text("x")),
            ("f".to_string(), FieldValue::Number(0.0)),
        ]
        .into_iter()
        .collect();

        let normalized = normalize(&snapshot);
        let keys: Vec<&str> = normalized.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["c", "e", "f"]);
        assert_eq!(normalized.get("c"), Some(&FieldValue::Bool(false)));
        assert_eq!(normalized.get("e"), Some(&FieldValue::text("x")));
    }

    #[test]
    fn test_normalized_json_shape() {
        let snapshot: FormSnapshot = [
            ("columns".to_string(), FieldValue::list(["S1", "S2"])),
            ("alpha".to_string(), FieldValue::Number(0.05)),
            ("top".to_string(), FieldValue::Number(10.0)),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_value(normalize(&snapshot));
        assert!(json.is_ok_and(|v| v == serde_json::json!({"alpha": 0.05, "columns": ["S1", "S2"], "top": 10})));
    }
}
