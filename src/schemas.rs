//! Built-in JSON Schemas (draft 2020-12) for the default profile.

use serde_json::{json, Value};

const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// Loose shape of incoming metadata. Unknown keys are allowed.
pub fn raw_metadata_schema() -> Value {
    let string_or_null = json!({ "type": ["string", "null"] });
    let mut properties = serde_json::Map::new();
    for key in [
        "name",
        "title",
        "description",
        "details",
        "summary",
        "image",
        "image_url",
        "imageUrl",
        "imageURI",
        "animation_url",
        "animationUrl",
        "animationURI",
        "external_url",
        "externalUrl",
    ] {
        properties.insert(key.to_string(), string_or_null.clone());
    }
    properties.insert("attributes".to_string(), json!({ "type": ["array", "object"] }));

    json!({
        "$schema": DRAFT_2020_12,
        "$id": "https://schemas.nftnorm.dev/raw-metadata.schema.json",
        "title": "Raw NFT metadata",
        "type": "object",
        "properties": properties
    })
}

/// Canonical normalized document. Unknown top-level and attribute keys fail
/// `additionalProperties` and are therefore stripped during validation.
pub fn normalized_metadata_schema() -> Value {
    json!({
        "$schema": DRAFT_2020_12,
        "$id": "https://schemas.nftnorm.dev/normalized-metadata.schema.json",
        "title": "Normalized NFT metadata",
        "type": "object",
        "required": ["name", "description", "image", "attributes"],
        "properties": {
            "name": { "type": "string" },
            "description": { "type": "string" },
            "image": { "type": "string" },
            "animation_url": { "type": "string" },
            "external_url": { "type": "string" },
            "attributes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["trait_type", "value"],
                    "properties": {
                        "trait_type": { "type": "string" },
                        "value": { "type": ["string", "number", "boolean"] },
                        "display_type": { "type": "string" }
                    },
                    "additionalProperties": false
                }
            },
            "hash": {
                "type": "string",
                "pattern": "^[a-f0-9]{64}$"
            }
        },
        "additionalProperties": false
    })
}
