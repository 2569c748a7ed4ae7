//! Normalized output documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::diagnostics::Diagnostic;
use crate::hashing::HASH_FIELD;

pub const META_FIELD: &str = "_meta";

/// Profile identity recorded in `_meta`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileRef {
    pub name: String,
    pub version: String,
}

/// Execution metadata attached after hashing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionMeta {
    pub profile: ProfileRef,
    pub source: String,
    pub timestamp: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// A fully normalized metadata object.
///
/// Serializes as the bare JSON object, so it can be handed straight to any
/// serde writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedDocument(Map<String, Value>);

impl NormalizedDocument {
    pub(crate) fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn attributes(&self) -> &[Value] {
        self.0
            .get("attributes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn hash(&self) -> Option<&str> {
        self.0.get(HASH_FIELD).and_then(Value::as_str)
    }

    /// Parsed `_meta` block, if present and well formed.
    pub fn meta(&self) -> Option<ExecutionMeta> {
        self.0
            .get(META_FIELD)
            .and_then(|meta| serde_json::from_value(meta.clone()).ok())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<NormalizedDocument> for Value {
    fn from(document: NormalizedDocument) -> Self {
        document.into_value()
    }
}
