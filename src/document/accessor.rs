//! Typed access over untyped resource documents
//!
//! Every helper distinguishes "absent" from "present with the wrong
//! shape": optional lookups return `Ok(None)` for missing fields and
//! `MalformedResource` for fields that exist but are not the expected
//! kind. Callers decide whether absence is acceptable; shape violations
//! are always structural errors.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Interpret a value as a JSON object, naming `field` in the error.
pub fn as_object<'a>(value: &'a Value, field: &str) -> Result<&'a Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::MalformedResource(format!("{field} is not a mapping"))),
    }
}

/// Mutable variant of [`as_object`].
pub fn as_object_mut<'a>(value: &'a mut Value, field: &str) -> Result<&'a mut Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::MalformedResource(format!("{field} is not a mapping"))),
    }
}

/// Look up an object-valued field. Absent is `Ok(None)`.
pub fn optional_object<'a>(
    map: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => as_object(value, key).map(Some),
    }
}

/// Mutable variant of [`optional_object`].
pub fn optional_object_mut<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
) -> Result<Option<&'a mut Map<String, Value>>> {
    match map.get_mut(key) {
        None => Ok(None),
        Some(value) => as_object_mut(value, key).map(Some),
    }
}

/// Look up a list-valued field. Absent is `Ok(None)`.
pub fn optional_list<'a>(map: &'a Map<String, Value>, key: &str) -> Result<Option<&'a Vec<Value>>> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_array()
            .map(Some)
            .ok_or_else(|| Error::MalformedResource(format!("{key} is not a list"))),
    }
}

/// Mutable variant of [`optional_list`].
pub fn optional_list_mut<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
) -> Result<Option<&'a mut Vec<Value>>> {
    match map.get_mut(key) {
        None => Ok(None),
        Some(value) => {
            if !value.is_array() {
                return Err(Error::MalformedResource(format!("{key} is not a list")));
            }
            Ok(value.as_array_mut())
        }
    }
}

/// Look up a string-valued field. Absent is `Ok(None)`.
pub fn optional_str<'a>(map: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| Error::MalformedResource(format!("{key} is not a string"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_object_rejects_non_mapping() {
        let value = json!(["a", "b"]);
        let err = as_object(&value, "spec").unwrap_err();
        assert!(matches!(err, Error::MalformedResource(msg) if msg.contains("spec")));
    }

    #[test]
    fn test_optional_object_absent_is_none() {
        let doc = json!({});
        let map = doc.as_object().unwrap();
        assert!(optional_object(map, "metadata").unwrap().is_none());
    }

    #[test]
    fn test_optional_object_wrong_shape_is_error() {
        let doc = json!({"metadata": "nope"});
        let map = doc.as_object().unwrap();
        assert!(optional_object(map, "metadata").is_err());
    }

    #[test]
    fn test_optional_list_and_str() {
        let doc = json!({"plugins": [1, 2], "name": "pg", "bad": 7});
        let map = doc.as_object().unwrap();
        assert_eq!(optional_list(map, "plugins").unwrap().unwrap().len(), 2);
        assert_eq!(optional_str(map, "name").unwrap(), Some("pg"));
        assert!(optional_str(map, "missing").unwrap().is_none());
        assert!(optional_str(map, "bad").is_err());
    }
}
