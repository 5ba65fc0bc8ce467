//! Values held by form fields
//!
//! A field holds a scalar, a list of selections, a boolean, or nothing.
//! Equality is strict: `Number(1.0)` never equals `Text("1")`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current value of one form field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum FieldValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Build a text value
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Build a list value
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Null, empty string and empty list count as "no value".
    /// `false` and `0` are real values.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Empty,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(FieldValue::Empty, FieldValue::Number),
            serde_json::Value::String(s) => FieldValue::Text(s),
            serde_json::Value::Array(items) => FieldValue::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            other @ serde_json::Value::Object(_) => FieldValue::Text(other.to_string()),
        }
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Empty => serde_json::Value::Null,
            FieldValue::Bool(b) => serde_json::Value::Bool(b),
            FieldValue::Number(n) => {
                // Integral numbers serialize without a trailing ".0"
                if n.fract().abs() < f64::EPSILON && n.abs() < 9.0e15 {
                    serde_json::Value::from(n as i64)
                } else {
                    serde_json::Number::from_f64(n)
                        .map_or(serde_json::Value::Null, serde_json::Value::Number)
                }
            }
            FieldValue::Text(s) => serde_json::Value::String(s),
            FieldValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::String).collect())
            }
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness_keeps_false_and_zero() {
        assert!(FieldValue::Empty.is_empty());
        assert!(FieldValue::text("").is_empty());
        assert!(FieldValue::List(Vec::new()).is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
        assert!(!FieldValue::list(["a"]).is_empty());
    }

    #[test]
    fn equality_does_not_coerce_types() {
        assert_ne!(FieldValue::Number(1.0), FieldValue::text("1"));
        assert_ne!(FieldValue::Bool(true), FieldValue::text("true"));
        assert_eq!(FieldValue::Number(1.0), FieldValue::from(serde_json::json!(1)));
    }

    #[test]
    fn converts_yaml_scalars_and_lists() {
        let parsed: Result<Vec<FieldValue>, _> =
            serde_yaml::from_str("[null, true, 2.5, hello, [a, 3]]");
        let Ok(values) = parsed else {
            assert!(false, "expected yaml to parse");
            return;
        };
        assert_eq!(
            values,
            vec![
                FieldValue::Empty,
                FieldValue::Bool(true),
                FieldValue::Number(2.5),
                FieldValue::text("hello"),
                FieldValue::list(["a", "3"]),
            ]
        );
    }

    #[test]
    fn integral_numbers_serialize_without_fraction() {
        let json = serde_json::to_string(&FieldValue::Number(10.0));
        assert!(json.is_ok_and(|s| s == "10"));
        let json = serde_json::to_string(&FieldValue::Number(0.05));
        assert!(json.is_ok_and(|s| s == "0.05"));
    }

    #[test]
    fn display_formats_bounds_like_the_label_messages() {
        assert_eq!(FieldValue::Number(10.0).to_string(), "10");
        assert_eq!(FieldValue::Number(0.5).to_string(), "0.5");
        assert_eq!(FieldValue::list(["a", "b"]).to_string(), "[a, b]");
    }
}
