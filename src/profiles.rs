//! Profile System - Normalization Pipelines as Data
//!
//! A profile bundles the output template, optional input/output schemas and
//! the ordered transformer list. Profiles are built once and shared
//! read-only by every normalization call.

use std::fmt;

use serde_json::{Map, Value};

use crate::normalizer::NormalizeError;
use crate::schemas::{normalized_metadata_schema, raw_metadata_schema};
use crate::transformers::{AttributesTransformer, CoreFieldsTransformer, Transformer};

pub const DEFAULT_PROFILE_NAME: &str = "default";
pub const DEFAULT_PROFILE_VERSION: &str = "2024.03";

pub struct Profile {
    pub name: String,
    pub version: String,
    pub description: String,
    pub input_schema: Option<Value>,
    pub output_schema: Option<Value>,
    /// Starting shape of every output; `None` seeds an empty object.
    pub template: Option<Map<String, Value>>,
    /// Run strictly in this order.
    pub transformers: Vec<Box<dyn Transformer>>,
}

impl Profile {
    pub fn transformer_names(&self) -> Vec<&str> {
        self.transformers.iter().map(|t| t.name()).collect()
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema.is_some())
            .field("output_schema", &self.output_schema.is_some())
            .field("template", &self.template)
            .field("transformers", &self.transformer_names())
            .finish()
    }
}

/// Baseline ERC-721/1155 pipeline: core fields, then attributes.
pub fn default_profile() -> Profile {
    let mut template = Map::new();
    template.insert("name".to_string(), Value::String(String::new()));
    template.insert("description".to_string(), Value::String(String::new()));
    template.insert("image".to_string(), Value::String(String::new()));
    template.insert("attributes".to_string(), Value::Array(Vec::new()));

    Profile {
        name: DEFAULT_PROFILE_NAME.to_string(),
        version: DEFAULT_PROFILE_VERSION.to_string(),
        description: "Baseline ERC-721/1155 metadata normalization pipeline.".to_string(),
        input_schema: Some(raw_metadata_schema()),
        output_schema: Some(normalized_metadata_schema()),
        template: Some(template),
        transformers: vec![Box::new(CoreFieldsTransformer), Box::new(AttributesTransformer)],
    }
}

/// Look up a built-in profile by name. Only `default` exists.
pub fn resolve(name: &str) -> Result<Profile, NormalizeError> {
    match name {
        DEFAULT_PROFILE_NAME => Ok(default_profile()),
        other => Err(NormalizeError::ProfileMissing(other.to_string())),
    }
}
