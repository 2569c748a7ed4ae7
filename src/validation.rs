//! Validation System - JSON Schema (draft 2020-12)
//!
//! A schema is compiled once into a [`SchemaValidator`] and reused for every
//! document. Validation collects every violation rather than stopping at the
//! first one.
//!
//! Properties rejected by an `additionalProperties` constraint are stripped
//! from the payload instead of failing it. Stripping only happens for those
//! properties; every other violation (wrong type, missing required field,
//! pattern mismatch) still fails the call.

use jsonschema::error::ValidationErrorKind;
use jsonschema::Draft;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

const ADDITIONAL_PROPERTIES: &str = "additionalProperties";

/// A single field-level schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    /// JSON pointer to the offending value (`""` for the document root).
    pub path: String,
    /// JSON pointer into the schema to the failing keyword.
    pub schema_path: String,
    /// The failing keyword (`type`, `required`, `pattern`, ...).
    pub keyword: String,
    pub message: String,
}

impl SchemaViolation {
    fn from_error(error: &jsonschema::ValidationError<'_>) -> Self {
        let schema_path = error.schema_path.to_string();
        let keyword = pointer_segments(&schema_path)
            .last()
            .cloned()
            .unwrap_or_default();
        Self {
            path: error.instance_path.to_string(),
            schema_path,
            keyword,
            message: error.to_string(),
        }
    }
}

/// Raised when a payload does not satisfy its schema.
#[derive(Debug, Clone, Error)]
#[error("Schema validation failed ({} violation(s))", .violations.len())]
pub struct ValidationError {
    pub violations: Vec<SchemaViolation>,
}

impl ValidationError {
    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }
}

/// Raised when a schema document cannot be compiled.
#[derive(Debug, Clone, Error)]
#[error("Invalid JSON schema: {message}")]
pub struct SchemaCompileError {
    pub message: String,
}

/// Compiled, reusable schema check.
#[derive(Debug)]
pub struct SchemaValidator {
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    pub fn compile(schema: &Value) -> Result<Self, SchemaCompileError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .should_validate_formats(true)
            .build(schema)
            .map_err(|e| SchemaCompileError {
                message: e.to_string(),
            })?;
        Ok(Self { validator })
    }

    /// Validate `payload`, stripping properties that fail an
    /// `additionalProperties` constraint.
    ///
    /// On success the payload may have lost those properties. On failure the
    /// error carries every remaining violation.
    pub fn validate(&self, payload: &mut Value) -> Result<(), ValidationError> {
        let mut removals = Vec::new();
        let mut violations = Vec::new();

        for error in self.validator.iter_errors(payload) {
            match additional_property_removal(&error) {
                Some(removal) => removals.push(removal),
                None => violations.push(SchemaViolation::from_error(&error)),
            }
        }

        if removals.is_empty() {
            return finish(violations);
        }

        for removal in &removals {
            removal.apply(payload);
        }
        tracing::debug!(
            stripped = removals.iter().map(|r| r.keys.len()).sum::<usize>(),
            "Stripped additional properties"
        );

        // Re-check the stripped payload so the verdict reflects what is returned.
        let violations = self
            .validator
            .iter_errors(payload)
            .map(|error| SchemaViolation::from_error(&error))
            .collect();
        finish(violations)
    }

    /// [`validate`](Self::validate) for a payload already known to be an object.
    pub fn validate_object(&self, payload: &mut Map<String, Value>) -> Result<(), ValidationError> {
        let mut value = Value::Object(std::mem::take(payload));
        let verdict = self.validate(&mut value);
        if let Value::Object(fields) = value {
            *payload = fields;
        }
        verdict
    }
}

fn finish(violations: Vec<SchemaViolation>) -> Result<(), ValidationError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

/// Keys to drop from the object at `object_pointer`.
#[derive(Debug)]
struct Removal {
    object_pointer: String,
    keys: Vec<String>,
}

impl Removal {
    fn apply(&self, payload: &mut Value) {
        if let Some(Value::Object(map)) = payload.pointer_mut(&self.object_pointer) {
            for key in &self.keys {
                map.shift_remove(key);
            }
        }
    }
}

/// Work out which property an `additionalProperties` failure refers to.
///
/// With `additionalProperties: false` the error sits on the object itself and
/// names the unexpected keys. With a schema-valued `additionalProperties` the
/// error sits somewhere inside the offending property's value, so the
/// instance path is walked back by the number of levels the schema path
/// descended after the keyword.
fn additional_property_removal(error: &jsonschema::ValidationError<'_>) -> Option<Removal> {
    let instance_path = error.instance_path.to_string();

    if let ValidationErrorKind::AdditionalProperties { unexpected } = &error.kind {
        return Some(Removal {
            object_pointer: instance_path,
            keys: unexpected.clone(),
        });
    }

    let schema_segments = pointer_segments(&error.schema_path.to_string());
    let keyword_at = keyword_position(&schema_segments, ADDITIONAL_PROPERTIES)?;
    let descent = instance_descent(&schema_segments[keyword_at + 1..]);

    let instance_segments = pointer_segments(&instance_path);
    let property_depth = instance_segments.len().checked_sub(descent + 1)?;
    let key = instance_segments.get(property_depth)?.clone();
    Some(Removal {
        object_pointer: join_pointer(&instance_segments[..property_depth]),
        keys: vec![key],
    })
}

/// Index of the last `keyword` segment used as a keyword, skipping segments
/// that name a property or definition (`/properties/additionalProperties`).
fn keyword_position(schema_segments: &[String], keyword: &str) -> Option<usize> {
    (0..schema_segments.len()).rev().find(|&at| {
        schema_segments[at] == keyword
            && !(at > 0 && names_child(&schema_segments[at - 1]))
    })
}

/// Keywords whose next schema path segment is a name rather than a keyword.
fn names_child(segment: &str) -> bool {
    matches!(
        segment,
        "properties" | "patternProperties" | "$defs" | "dependentSchemas"
    )
}

/// How many instance levels a schema path walks down.
fn instance_descent(schema_segments: &[String]) -> usize {
    let mut descent = 0;
    let mut iter = schema_segments.iter();
    while let Some(segment) = iter.next() {
        match segment.as_str() {
            // Followed by a property name or index.
            "properties" | "patternProperties" | "prefixItems" => {
                iter.next();
                descent += 1;
            }
            "dependentSchemas" | "$defs" => {
                iter.next();
            }
            "items" | "contains" | "unevaluatedItems" | "unevaluatedProperties" => descent += 1,
            _ => {}
        }
    }
    descent
}

fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

fn join_pointer(segments: &[String]) -> String {
    segments
        .iter()
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect()
}
