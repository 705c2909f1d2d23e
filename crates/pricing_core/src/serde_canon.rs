//! Canonical JSON serialization for artifact digests
//!
//! Object keys are sorted recursively and output carries no whitespace, so
//! two artifacts with the same content always hash to the same blake3 digest
//! regardless of how the exporter ordered its fields.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanonicalError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Serialize a value to canonical JSON (sorted keys, no whitespace)
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let json_value = serde_json::to_value(value)
        .map_err(|e| CanonicalError::SerializationError(e.to_string()))?;

    let canonical = canonicalize_value(&json_value);
    serde_json::to_string(&canonical).map_err(|e| CanonicalError::SerializationError(e.to_string()))
}

fn canonicalize_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let sorted: BTreeMap<_, _> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize_value(v)))
                .collect();
            serde_json::Value::Object(sorted.into_iter().collect())
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(canonicalize_value).collect())
        }
        other => other.clone(),
    }
}

/// Blake3 digest of the canonical JSON form, hex encoded
pub fn hash_canonical_hex<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let json = to_canonical_json(value)?;
    Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Scaler {
        data_max: Vec<f64>,
        data_min: Vec<f64>,
    }

    #[test]
    fn test_keys_sorted_without_whitespace() {
        let json = to_canonical_json(&Scaler {
            data_max: vec![2.0],
            data_min: vec![1.0],
        })
        .unwrap();
        assert_eq!(json, r#"{"data_max":[2.0],"data_min":[1.0]}"#);
    }

    #[test]
    fn test_map_insertion_order_does_not_change_digest() {
        let mut first = HashMap::new();
        first.insert("gold", 0);
        first.insert("silver", 1);
        first.insert("platinum", 2);

        let mut second = HashMap::new();
        second.insert("platinum", 2);
        second.insert("gold", 0);
        second.insert("silver", 1);

        let h1 = hash_canonical_hex(&first).unwrap();
        let h2 = hash_canonical_hex(&second).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_digest_changes_with_content() {
        let a = hash_canonical_hex(&vec!["Category", "Year"]).unwrap();
        let b = hash_canonical_hex(&vec!["Year", "Category"]).unwrap();
        assert_ne!(a, b);
    }
}
