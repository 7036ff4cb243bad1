//! Loosely typed property values as handed out by the host
//!
//! Most host properties are plain JSON-like data, but some of them can hold
//! the host's "mixed" symbol (for example `fontSize` on a text node whose
//! runs use different sizes). That symbol has no structural representation,
//! so `HostValue` serializes it as a marker object which the selection
//! engine's serialization guard turns into `null`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Key of the marker object a `HostValue::Mixed` serializes to
pub const SYMBOL_MARKER: &str = "$hostSymbol";

/// A raw property value read from the host
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HostValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<HostValue>),
    Object(BTreeMap<String, HostValue>),
    /// The host's non-serializable "mixed" symbol
    Mixed,
}

impl HostValue {
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, HostValue::Mixed)
    }

    /// Null, boolean, number or string
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            HostValue::Null | HostValue::Bool(_) | HostValue::Number(_) | HostValue::String(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[HostValue]> {
        match self {
            HostValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, HostValue>> {
        match self {
            HostValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a field of an object value
    pub fn get(&self, key: &str) -> Option<&HostValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Name of the value's kind, used in log messages
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Bool(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Array(_) => "array",
            HostValue::Object(_) => "object",
            HostValue::Mixed => "mixed",
        }
    }
}

impl From<serde_json::Value> for HostValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => HostValue::Null,
            serde_json::Value::Bool(b) => HostValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(HostValue::Null, HostValue::Number),
            serde_json::Value::String(s) => HostValue::String(s),
            serde_json::Value::Array(items) => {
                HostValue::Array(items.into_iter().map(HostValue::from).collect())
            }
            serde_json::Value::Object(map) => {
                if map.len() == 1 && map.contains_key(SYMBOL_MARKER) {
                    return HostValue::Mixed;
                }
                HostValue::Object(
                    map.into_iter()
                        .map(|(key, value)| (key, HostValue::from(value)))
                        .collect(),
                )
            }
        }
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::String(value.to_string())
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Number(value)
    }
}

impl Serialize for HostValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        match self {
            HostValue::Null => serializer.serialize_unit(),
            HostValue::Bool(b) => serializer.serialize_bool(*b),
            HostValue::Number(n) => serializer.serialize_f64(*n),
            HostValue::String(s) => serializer.serialize_str(s),
            HostValue::Array(items) => items.serialize(serializer),
            HostValue::Object(map) => map.serialize(serializer),
            HostValue::Mixed => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(SYMBOL_MARKER, "mixed")?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for HostValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(HostValue::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_marker_is_mixed() {
        let value = HostValue::from(json!({ "$hostSymbol": "mixed" }));
        assert!(value.is_mixed());
    }

    #[test]
    fn test_object_access() {
        let value = HostValue::from(json!({ "type": "SOLID", "opacity": 0.5 }));
        assert_eq!(value.get("type").and_then(HostValue::as_str), Some("SOLID"));
        assert_eq!(value.get("opacity").and_then(HostValue::as_f64), Some(0.5));
        assert!(value.get("missing").is_none());
    }

    #[test]
    fn test_mixed_serializes_to_marker() {
        let encoded = serde_json::to_value(HostValue::Mixed).unwrap();
        assert_eq!(encoded, json!({ "$hostSymbol": "mixed" }));
    }

    #[test]
    fn test_primitive_kinds() {
        assert!(HostValue::Null.is_primitive());
        assert!(HostValue::from("x").is_primitive());
        assert!(!HostValue::Mixed.is_primitive());
        assert!(!HostValue::Array(vec![]).is_primitive());
    }
}
