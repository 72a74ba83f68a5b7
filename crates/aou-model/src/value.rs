//! Raw API values.
//!
//! The participant summary API returns a mix of strings, numbers, booleans and
//! the occasional nested structure. Values are kept close to the wire so that
//! each codec decides how to read them.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel the API uses for "no value".
pub const UNSET: &str = "UNSET";

/// A single field value from the source API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Arrays and objects, carried verbatim.
    Json(Value),
}

impl RawValue {
    /// Returns the string payload for text values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// True when the value is the API's `UNSET` sentinel.
    pub fn is_unset(&self) -> bool {
        self.as_str() == Some(UNSET)
    }

    /// True for null, empty text and empty compound values.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Json(Value::Array(items)) => items.is_empty(),
            Self::Json(Value::Object(map)) => map.is_empty(),
            _ => false,
        }
    }

    /// Best-effort integer view (integers, whole floats, numeric text).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(number) => Some(*number),
            Self::Float(number) if number.fract() == 0.0 => Some(*number as i64),
            Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Stringifies the value for the reporting schema.
    ///
    /// Null and empty compound values become the empty string; other compound
    /// values are rendered as compact JSON.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Bool(flag) => Cow::Owned(flag.to_string()),
            Self::Integer(number) => Cow::Owned(number.to_string()),
            Self::Float(number) => Cow::Owned(number.to_string()),
            Self::Text(text) => Cow::Borrowed(text),
            Self::Json(_) if self.is_blank() => Cow::Borrowed(""),
            Self::Json(value) => Cow::Owned(value.to_string()),
        }
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => {
                if let Some(integer) = number.as_i64() {
                    Self::Integer(integer)
                } else if let Some(float) = number.as_f64() {
                    Self::Float(float)
                } else {
                    Self::Text(number.to_string())
                }
            }
            Value::String(text) => Self::Text(text),
            other => Self::Json(other),
        }
    }
}

impl From<RawValue> for Value {
    fn from(value: RawValue) -> Self {
        match value {
            RawValue::Null => Value::Null,
            RawValue::Bool(flag) => Value::Bool(flag),
            RawValue::Integer(number) => Value::from(number),
            RawValue::Float(number) => Value::from(number),
            RawValue::Text(text) => Value::String(text),
            RawValue::Json(value) => value,
        }
    }
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for RawValue {
    fn from(number: i64) -> Self {
        Self::Integer(number)
    }
}

impl From<bool> for RawValue {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_wire_types() {
        let values: Vec<RawValue> =
            serde_json::from_value(json!(["UNSET", 3, 2.5, true, null, [], {"a": 1}]))
                .expect("deserialize values");
        assert_eq!(values[0], RawValue::Text("UNSET".to_string()));
        assert_eq!(values[1], RawValue::Integer(3));
        assert_eq!(values[2], RawValue::Float(2.5));
        assert_eq!(values[3], RawValue::Bool(true));
        assert_eq!(values[4], RawValue::Null);
        assert!(matches!(values[5], RawValue::Json(_)));
        assert!(matches!(values[6], RawValue::Json(_)));
    }

    #[test]
    fn stringifies_for_reporting() {
        assert_eq!(RawValue::Integer(12).as_text(), "12");
        assert_eq!(RawValue::Bool(false).as_text(), "false");
        assert_eq!(RawValue::Null.as_text(), "");
        assert_eq!(RawValue::Json(json!([])).as_text(), "");
        assert_eq!(RawValue::Json(json!({"a": 1})).as_text(), r#"{"a":1}"#);
    }

    #[test]
    fn integer_view_accepts_numeric_text() {
        assert_eq!(RawValue::from("3").as_i64(), Some(3));
        assert_eq!(RawValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(RawValue::Float(3.5).as_i64(), None);
        assert_eq!(RawValue::from("three").as_i64(), None);
    }

    #[test]
    fn unset_sentinel() {
        assert!(RawValue::from(UNSET).is_unset());
        assert!(!RawValue::from("SUBMITTED").is_unset());
        assert!(!RawValue::Null.is_unset());
    }
}
