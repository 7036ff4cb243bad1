//! Serialization guard
//!
//! Last pass before anything leaves the engine. The value is encoded into a
//! structural `serde_json::Value` tree, then a transform hook walks the tree:
//! host symbol markers become `null`, image data URIs under a data key are
//! kept verbatim without being descended into, and everything else is left
//! as it is. Running the guard on its own output returns that output
//! unchanged.

use scene_graph::SYMBOL_MARKER;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::image::{DATA_KEYS, DATA_URI_PREFIX};
use crate::error::GuardError;

/// Encode `value` and strip everything that is not plain structural data.
pub fn sanitize<T: Serialize + ?Sized>(value: &T) -> Result<Value, GuardError> {
    let encoded = serde_json::to_value(value)?;
    Ok(transform(None, encoded))
}

/// Whether `value` under `key` is an image payload to pass through untouched
pub fn is_image_payload(key: Option<&str>, value: &Value) -> bool {
    match (key, value) {
        (Some(key), Value::String(text)) => {
            DATA_KEYS.contains(&key) && text.starts_with(DATA_URI_PREFIX)
        }
        _ => false,
    }
}

fn is_symbol_marker(map: &Map<String, Value>) -> bool {
    map.len() == 1 && map.contains_key(SYMBOL_MARKER)
}

fn transform(key: Option<&str>, value: Value) -> Value {
    if is_image_payload(key, &value) {
        return value;
    }
    match value {
        Value::Object(map) if is_symbol_marker(&map) => Value::Null,
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let value = transform(Some(&key), value);
                    (key, value)
                })
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| transform(None, item)).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_graph::HostValue;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Payload {
        id: String,
        font_size: HostValue,
        props: BTreeMap<String, HostValue>,
        image_data: String,
    }

    fn payload() -> Payload {
        let mut props = BTreeMap::new();
        props.insert("size".to_string(), HostValue::Mixed);
        props.insert("label".to_string(), HostValue::from("Buy"));
        Payload {
            id: "1:1".to_string(),
            font_size: HostValue::Mixed,
            props,
            image_data: format!("data:image/png;base64,{}", "QUJD".repeat(1000)),
        }
    }

    #[test]
    fn test_mixed_becomes_null() {
        let safe = sanitize(&payload()).unwrap();
        assert_eq!(safe["fontSize"], Value::Null);
        assert_eq!(safe["props"]["size"], Value::Null);
        assert_eq!(safe["props"]["label"], "Buy");
    }

    #[test]
    fn test_image_data_preserved_byte_for_byte() {
        let original = payload();
        let safe = sanitize(&original).unwrap();
        assert_eq!(safe["imageData"].as_str(), Some(original.image_data.as_str()));
    }

    #[test]
    fn test_guard_is_fixed_point() {
        let once = sanitize(&payload()).unwrap();
        let twice = sanitize(&once).unwrap();
        assert_eq!(once, twice);

        let decoded: Value = serde_json::from_str(&serde_json::to_string(&once).unwrap()).unwrap();
        assert_eq!(decoded, once);
    }

    #[test]
    fn test_plain_values_untouched() {
        let value = json!({
            "a": [1, "two", null, true],
            "nested": { "data": "not an image", "empty": {} }
        });
        assert_eq!(sanitize(&value).unwrap(), value);
    }

    #[test]
    fn test_image_payload_detection() {
        let uri = json!("data:image/jpeg;base64,AAAA");
        assert!(is_image_payload(Some("data"), &uri));
        assert!(is_image_payload(Some("imageData"), &uri));
        assert!(!is_image_payload(Some("preview"), &uri));
        assert!(!is_image_payload(None, &uri));
    }
}
