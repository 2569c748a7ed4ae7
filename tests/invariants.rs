//! Contract Invariant Tests
//!
//! These tests verify the guarantees of the normalization pipeline.

use nftnorm_core::{
    compute_content_hash, default_profile, normalize, DiagnosticLevel, FnTransformer,
    NormalizeError, NormalizeOptions, Normalizer, SchemaStage,
};
use serde_json::{json, Value};

const TS: &str = "2024-03-01T12:00:00.000Z";

fn sample() -> Value {
    json!({
        "name": "Demo Asset",
        "description": "Sandbox-only NFT metadata example.",
        "image": "ipfs://demo-asset",
        "attributes": [
            {"trait_type": "Background", "value": "Teal"},
            {"trait_type": "Level", "value": 5, "display_type": "number"}
        ]
    })
}

fn erc1155() -> Value {
    json!({
        "title": "Enjin Prototype",
        "details": "ERC-1155 style payload",
        "image_url": "https://cdn.example.com/1155.png",
        "attributes": {"rarity": "prototype", "supply": 16}
    })
}

fn is_attribute_entry(entry: &Value) -> bool {
    let Some(map) = entry.as_object() else {
        return false;
    };
    let trait_ok = map.get("trait_type").is_some_and(Value::is_string);
    let value_ok = map
        .get("value")
        .is_some_and(|v| v.is_string() || v.is_number() || v.is_boolean());
    let display_ok = map.get("display_type").map_or(true, Value::is_string);
    let keys_ok = map
        .keys()
        .all(|k| matches!(k.as_str(), "trait_type" | "value" | "display_type"));
    trait_ok && value_ok && display_ok && keys_ok
}

#[test]
fn invariant_sample_normalizes_with_hash_by_default() {
    let doc = normalize(&sample(), &NormalizeOptions::default()).unwrap();
    assert_eq!(doc.name(), Some("Demo Asset"));
    assert_eq!(doc.get("description"), Some(&json!("Sandbox-only NFT metadata example.")));
    assert_eq!(doc.get("image"), Some(&json!("ipfs://demo-asset")));

    let hash = doc.hash().unwrap();
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
}

#[test]
fn invariant_hash_can_be_disabled() {
    let doc = normalize(&sample(), &NormalizeOptions::default().with_hash(false)).unwrap();
    assert!(doc.hash().is_none());
}

#[test]
fn invariant_attributes_always_valid_array() {
    let inputs = [
        sample(),
        erc1155(),
        json!({}),
        json!({"attributes": [{"trait": "a", "val": [1, 2]}, null, "x", {"traitType": "b"}]}),
    ];
    for raw in inputs {
        let doc = normalize(&raw, &NormalizeOptions::default()).unwrap();
        assert!(doc.get("attributes").unwrap().is_array());
        assert!(doc.attributes().iter().all(is_attribute_entry));
    }
}

#[test]
fn invariant_hash_matches_separately_computed_hash() {
    for raw in [sample(), erc1155(), json!({})] {
        let opts = NormalizeOptions::default().with_timestamp(TS);
        let unhashed = normalize(&raw, &opts.clone().with_hash(false)).unwrap();
        let hashed = normalize(&raw, &opts).unwrap();
        assert_eq!(
            compute_content_hash(unhashed.as_map()).unwrap(),
            hashed.hash().unwrap()
        );
    }
}

#[test]
fn invariant_deterministic_for_fixed_timestamp() {
    let opts = NormalizeOptions::default()
        .with_meta(true)
        .with_source("fixture")
        .with_timestamp(TS);
    let first = serde_json::to_string(&normalize(&erc1155(), &opts).unwrap()).unwrap();
    let second = serde_json::to_string(&normalize(&erc1155(), &opts).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn invariant_empty_input_filled_with_defaults() {
    let doc = normalize(&json!({}), &NormalizeOptions::default()).unwrap();
    let hash = doc.hash().unwrap().to_string();
    assert_eq!(
        doc.into_value(),
        json!({
            "name": "",
            "description": "",
            "image": "",
            "attributes": [],
            "hash": hash
        })
    );
}

#[test]
fn invariant_object_attributes_converted() {
    let doc = normalize(&erc1155(), &NormalizeOptions::default().with_meta(true)).unwrap();
    assert_eq!(
        doc.get("attributes"),
        Some(&json!([
            {"trait_type": "rarity", "value": "prototype"},
            {"trait_type": "supply", "value": 16}
        ]))
    );
    assert_eq!(doc.name(), Some("Enjin Prototype"));
    assert_eq!(doc.get("image"), Some(&json!("https://cdn.example.com/1155.png")));

    let meta = doc.meta().unwrap();
    assert!(meta.diagnostics.iter().any(|d| {
        d.level == DiagnosticLevel::Info && d.message == "Converted object attributes to array"
    }));
}

#[test]
fn invariant_malformed_attributes_dropped_with_warning() {
    let raw = json!({"name": "x", "attributes": [{"foo": 1}, {"bar": 2}]});
    let doc = normalize(&raw, &NormalizeOptions::default().with_meta(true)).unwrap();
    assert!(doc.attributes().is_empty());
    let meta = doc.meta().unwrap();
    let warnings: Vec<_> = meta
        .diagnostics
        .iter()
        .filter(|d| d.level == DiagnosticLevel::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].path, "attributes");
}

#[test]
fn invariant_invalid_input_type_rejected_before_transformers() {
    let mut profile = default_profile();
    profile.transformers.insert(
        0,
        Box::new(FnTransformer::new("must_not_run", |_, _| {
            Err("transformer ran".into())
        })),
    );
    let normalizer = Normalizer::new(profile).unwrap();
    for raw in [json!([{"name": "x"}]), json!("metadata")] {
        let err = normalizer.normalize(&raw, &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidInputType { .. }));
    }
}

#[test]
fn invariant_output_schema_violation_reported() {
    let mut profile = default_profile();
    profile
        .template
        .as_mut()
        .unwrap()
        .insert("name".to_string(), json!(42));
    let normalizer = Normalizer::new(profile).unwrap();

    let err = normalizer
        .normalize(&json!({"description": "no name here"}), &NormalizeOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        NormalizeError::SchemaValidationFailed {
            stage: SchemaStage::Output,
            ..
        }
    ));
    assert!(!err.violations().is_empty());
    assert!(err.violations().iter().any(|v| v.path == "/name"));
}

#[test]
fn invariant_unknown_output_fields_stripped_not_rejected() {
    let mut profile = default_profile();
    profile
        .template
        .as_mut()
        .unwrap()
        .insert("internal_note".to_string(), json!("drop me"));
    let normalizer = Normalizer::new(profile).unwrap();

    let doc = normalizer
        .normalize(&json!({"name": "kept"}), &NormalizeOptions::default())
        .unwrap();
    assert!(doc.get("internal_note").is_none());
    assert_eq!(doc.name(), Some("kept"));
}

#[test]
fn invariant_meta_excluded_from_hash() {
    let base = NormalizeOptions::default().with_timestamp(TS);
    let plain = normalize(&sample(), &base).unwrap();
    let with_meta = normalize(&sample(), &base.clone().with_meta(true).with_source("a")).unwrap();
    assert_eq!(plain.hash(), with_meta.hash());
}

#[test]
fn invariant_concurrent_calls_share_one_normalizer() {
    let normalizer = Normalizer::new(default_profile()).unwrap();
    let opts = NormalizeOptions::default().with_timestamp(TS);
    let expected = normalizer.normalize(&erc1155(), &opts).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| normalizer.normalize(&erc1155(), &opts).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
