//! wtfl-writer: renders plain values as WTFL documents.
//!
//! Every keyword is spelled with a synonym picked at random, so two
//! renderings of the same value rarely match textually, but both read back
//! to that value.

mod plain;
mod render;
pub mod synonyms;

use rand::Rng;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Documents are always objects at the top level.
    #[error("a document must be an object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("value cannot be represented: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Render `value` with the thread-local RNG.
pub fn to_string(value: &Value) -> Result<String, WriteError> {
    to_string_with_rng(value, &mut rand::thread_rng())
}

/// Render `value`, drawing synonym choices from `rng`.
pub fn to_string_with_rng<R: Rng + ?Sized>(value: &Value, rng: &mut R) -> Result<String, WriteError> {
    let Value::Object(map) = value else {
        return Err(WriteError::NotAnObject {
            found: kind_of(value),
        });
    };
    let text = render::Renderer::new(rng).document(map);
    tracing::debug!(entries = map.len(), bytes = text.len(), "rendered document");
    Ok(text)
}

/// Render any serializable value. NaN and infinite floats have no literal,
/// so the fields and elements holding them are left out.
pub fn to_string_from<T: Serialize + ?Sized>(value: &T) -> Result<String, WriteError> {
    to_string(&plain::to_plain(value)?.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn top_level_must_be_an_object() {
        let err = to_string(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, WriteError::NotAnObject { found: "an array" }));
        assert_eq!(err.to_string(), "a document must be an object, got an array");
    }

    #[test]
    fn empty_object_is_an_empty_document() {
        assert_eq!(to_string(&json!({})).unwrap(), "");
    }

    #[test]
    fn serializable_values_render() {
        let mut map = BTreeMap::new();
        map.insert("n", 1);
        let out = to_string_from(&map).unwrap();
        assert!(out.starts_with("\"n\""));
        assert!(out.ends_with(" 1"));
    }

    #[derive(Serialize)]
    struct Sample {
        ok: i32,
        bad: f64,
    }

    #[test]
    fn values_without_a_literal_are_dropped() {
        let out = to_string_from(&Sample {
            ok: 1,
            bad: f64::NAN,
        })
        .unwrap();
        assert!(!out.contains("bad"), "{}", out);
        assert_eq!(wtfl_core::read(&out).unwrap(), json!({ "ok": 1 }));

        let err = to_string_from(&f64::INFINITY).unwrap_err();
        assert!(matches!(err, WriteError::NotAnObject { found: "null" }));
    }

    #[test]
    fn non_string_map_keys_are_rejected() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], 1);
        assert!(matches!(
            to_string_from(&map),
            Err(WriteError::Serialize(_))
        ));
    }
}
