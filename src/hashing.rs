//! Hashing System - SHA-256 Content Fingerprints
//!
//! Provides deterministic, reproducible hashes for normalized documents.
//! The `hash` field is always excluded so a document's hash is a fixed
//! point: computing it again over the hashed document yields the same value.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Name of the field that carries the content hash.
pub const HASH_FIELD: &str = "hash";

/// Compute SHA-256 hash of bytes, return lowercase hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Convert to canonical JSON (keys in object order, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Compute the content hash of a document with its own `hash` field excluded.
pub fn compute_content_hash(document: &Map<String, Value>) -> Result<String, serde_json::Error> {
    let payload: Map<String, Value> = document
        .iter()
        .filter(|(key, _)| key.as_str() != HASH_FIELD)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let canonical = canonical_json(&payload)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_canonical_json_compact_and_ordered() {
        let obj = json!({"z": 1, "a": [1, 2], "m": {"b": true}});
        let canonical = canonical_json(&obj).unwrap();
        assert_eq!(canonical, r#"{"z":1,"a":[1,2],"m":{"b":true}}"#);
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_field_excluded() {
        let without = object(json!({"name": "a", "attributes": []}));
        let with = object(json!({"name": "a", "attributes": [], "hash": "ff"}));
        assert_eq!(
            compute_content_hash(&without).unwrap(),
            compute_content_hash(&with).unwrap()
        );
    }

    #[test]
    fn test_content_hash_is_fixed_point() {
        let mut doc = object(json!({"name": "Demo", "description": "", "image": ""}));
        let first = compute_content_hash(&doc).unwrap();
        doc.insert(HASH_FIELD.to_string(), Value::String(first.clone()));
        assert_eq!(compute_content_hash(&doc).unwrap(), first);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_content_hash_sensitive_to_values() {
        let a = object(json!({"name": "a"}));
        let b = object(json!({"name": "b"}));
        assert_ne!(compute_content_hash(&a).unwrap(), compute_content_hash(&b).unwrap());
    }
}
