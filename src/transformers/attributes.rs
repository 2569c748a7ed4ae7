//! Attribute normalization.
//!
//! Accepts either the standard array of trait entries or a plain
//! `trait -> value` object, and emits a clean array of
//! `{trait_type, value, display_type?}` entries. Malformed entries are
//! dropped without failing the document.

use serde_json::{Map, Value};

use super::{first_present, Context, TransformError, Transformer, WorkingState};

const TRAIT_KEYS: &[&str] = &["trait_type", "traitType", "trait"];
const VALUE_KEYS: &[&str] = &["value", "val", "display_value"];
const DISPLAY_TYPE_KEYS: &[&str] = &["display_type", "displayType"];

pub const ATTRIBUTES_FIELD: &str = "attributes";

pub struct AttributesTransformer;

impl Transformer for AttributesTransformer {
    fn name(&self) -> &str {
        "attributes"
    }

    fn transform(&self, state: &mut WorkingState<'_>, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        let normalized: Vec<Value> = match state.raw.get(ATTRIBUTES_FIELD) {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|entry| entry.as_object().and_then(normalize_entry))
                .collect(),
            Some(Value::Object(traits)) => {
                let entries = traits
                    .iter()
                    .filter_map(|(trait_name, value)| {
                        let mut entry = Map::new();
                        entry.insert("trait_type".to_string(), Value::String(trait_name.clone()));
                        entry.insert("value".to_string(), value.clone());
                        normalize_entry(&entry)
                    })
                    .collect();
                ctx.info("Converted object attributes to array", ATTRIBUTES_FIELD);
                entries
            }
            _ => Vec::new(),
        };

        let empty = normalized.is_empty();
        state
            .result
            .insert(ATTRIBUTES_FIELD.to_string(), Value::Array(normalized));

        if empty {
            ctx.warning("No attribute entries detected", ATTRIBUTES_FIELD);
        }
        Ok(())
    }
}

/// Normalize one trait entry, or `None` when it has no usable trait or value.
pub fn normalize_entry(entry: &Map<String, Value>) -> Option<Value> {
    let (_, trait_name) = first_present(entry, TRAIT_KEYS)?;
    if trait_name.is_null() {
        return None;
    }
    let value = VALUE_KEYS
        .iter()
        .filter_map(|key| entry.get(*key))
        .find(|value| !value.is_null())?;

    let mut normalized = Map::new();
    normalized.insert(
        "trait_type".to_string(),
        Value::String(stringify(trait_name).trim().to_string()),
    );
    normalized.insert("value".to_string(), coerce_value(value));

    if let Some((_, display_type)) = first_present(entry, DISPLAY_TYPE_KEYS) {
        if !display_type.is_null() {
            normalized.insert("display_type".to_string(), Value::String(stringify(display_type)));
        }
    }
    Some(Value::Object(normalized))
}

/// Numbers and booleans pass through; containers become JSON text.
fn coerce_value(value: &Value) -> Value {
    match value {
        Value::Number(_) | Value::Bool(_) => value.clone(),
        Value::Null => Value::String(String::new()),
        Value::String(text) => Value::String(text.clone()),
        Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
    }
}

/// Text form of a scalar. Integral floats print without a fraction (`1.0` -> `"1"`).
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
                format!("{float:.0}")
            }
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}
