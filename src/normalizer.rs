//! Normalizer Engine - Single Entry Point
//!
//! `normalize` runs the whole pipeline for one document:
//! input validation, template seeding, transformers in profile order, output
//! validation, hashing and finally `_meta`. Any failure aborts the call; no
//! partially normalized document is ever returned.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::document::{ExecutionMeta, NormalizedDocument, ProfileRef, META_FIELD};
use crate::hashing::{compute_content_hash, HASH_FIELD};
use crate::profiles::Profile;
use crate::transformers::{Context, TransformError, WorkingState};
use crate::validation::{SchemaCompileError, SchemaValidator, SchemaViolation, ValidationError};

pub const DEFAULT_SOURCE: &str = "unspecified";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaStage {
    Input,
    Output,
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Profile not found: {0}")]
    ProfileMissing(String),

    #[error("Profile {profile} has an invalid {stage:?} schema: {source}")]
    InvalidProfile {
        profile: String,
        stage: SchemaStage,
        #[source]
        source: SchemaCompileError,
    },

    #[error("Metadata input must be an object, got {found}")]
    InvalidInputType { found: &'static str },

    #[error("{stage:?} schema validation failed: {source}")]
    SchemaValidationFailed {
        stage: SchemaStage,
        #[source]
        source: ValidationError,
    },

    #[error("Transformer execution failed in {transformer}: {source}")]
    TransformerExecutionFailed {
        transformer: String,
        #[source]
        source: TransformError,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl NormalizeError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            NormalizeError::ProfileMissing(_) => "PROFILE_MISSING",
            NormalizeError::InvalidProfile { .. } => "PROFILE_INVALID",
            NormalizeError::InvalidInputType { .. } => "INVALID_INPUT_TYPE",
            NormalizeError::SchemaValidationFailed { .. } => "VALIDATION_ERROR",
            NormalizeError::TransformerExecutionFailed { .. } => "TRANSFORMER_ERROR",
            NormalizeError::SerializationError(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Structured schema violations, empty for every other error kind.
    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            NormalizeError::SchemaValidationFailed { source, .. } => source.violations(),
            _ => &[],
        }
    }
}

/// Caller-facing options. Every field is independently defaultable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizeOptions {
    pub hash: bool,
    pub include_meta: bool,
    pub source: Option<String>,
    /// ISO-8601 instant; defaults to the call time.
    pub timestamp: Option<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            hash: true,
            include_meta: false,
            source: None,
            timestamp: None,
        }
    }
}

impl NormalizeOptions {
    pub fn with_hash(mut self, hash: bool) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_meta(mut self, include_meta: bool) -> Self {
        self.include_meta = include_meta;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn resolve(&self) -> ResolvedOptions {
        ResolvedOptions {
            hash: self.hash,
            include_meta: self.include_meta,
            source: self
                .source
                .clone()
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            timestamp: self.timestamp.clone().unwrap_or_else(now_iso8601),
        }
    }
}

/// Options with every default applied, as seen by transformers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOptions {
    pub hash: bool,
    pub include_meta: bool,
    pub source: String,
    pub timestamp: String,
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Owns a profile and its compiled schemas.
///
/// Immutable after construction, so one instance can serve concurrent calls.
#[derive(Debug)]
pub struct Normalizer {
    profile: Profile,
    input_validator: Option<SchemaValidator>,
    output_validator: Option<SchemaValidator>,
}

impl Normalizer {
    /// Build a normalizer, compiling the profile's schemas up front.
    pub fn new(profile: Profile) -> Result<Self, NormalizeError> {
        let input_validator = compile(&profile, SchemaStage::Input, profile.input_schema.as_ref())?;
        let output_validator = compile(&profile, SchemaStage::Output, profile.output_schema.as_ref())?;
        tracing::debug!(
            profile = %profile.name,
            version = %profile.version,
            transformers = ?profile.transformer_names(),
            "Normalizer ready"
        );
        Ok(Self {
            profile,
            input_validator,
            output_validator,
        })
    }

    /// Build a normalizer for a built-in profile name.
    pub fn for_profile(name: &str) -> Result<Self, NormalizeError> {
        Self::new(crate::profiles::resolve(name)?)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Normalize one raw metadata document.
    pub fn normalize(
        &self,
        raw: &Value,
        options: &NormalizeOptions,
    ) -> Result<NormalizedDocument, NormalizeError> {
        let opts = options.resolve();

        let checked_raw;
        let raw_fields = match (raw, &self.input_validator) {
            (Value::Object(fields), Some(validator)) => {
                let mut fields = fields.clone();
                validator
                    .validate_object(&mut fields)
                    .map_err(|source| NormalizeError::SchemaValidationFailed {
                        stage: SchemaStage::Input,
                        source,
                    })?;
                checked_raw = fields;
                &checked_raw
            }
            (Value::Object(fields), None) => fields,
            (other, _) => {
                return Err(NormalizeError::InvalidInputType {
                    found: json_kind(other),
                })
            }
        };

        let template = self.profile.template.clone().unwrap_or_default();
        let mut state = WorkingState {
            raw: raw_fields,
            result: template,
        };
        let mut ctx = Context::new(&self.profile, &opts);

        for transformer in &self.profile.transformers {
            tracing::trace!(transformer = transformer.name(), "Running transformer");
            transformer
                .transform(&mut state, &mut ctx)
                .map_err(|source| NormalizeError::TransformerExecutionFailed {
                    transformer: transformer.name().to_string(),
                    source,
                })?;
            self.restore_template_keys(&mut state.result);
        }

        // The working state is consumed here; callers never see it.
        let mut output = state.result;
        if let Some(validator) = &self.output_validator {
            validator
                .validate_object(&mut output)
                .map_err(|source| NormalizeError::SchemaValidationFailed {
                    stage: SchemaStage::Output,
                    source,
                })?;
        }

        if opts.hash {
            let hash = compute_content_hash(&output)?;
            output.insert(HASH_FIELD.to_string(), Value::String(hash));
        }

        let diagnostics = ctx.into_diagnostics();
        tracing::debug!(
            source = %opts.source,
            diagnostics = diagnostics.len(),
            "Document normalized"
        );

        if opts.include_meta {
            let meta = ExecutionMeta {
                profile: ProfileRef {
                    name: self.profile.name.clone(),
                    version: self.profile.version.clone(),
                },
                source: opts.source,
                timestamp: opts.timestamp,
                diagnostics,
            };
            output.insert(META_FIELD.to_string(), serde_json::to_value(meta)?);
        }

        Ok(NormalizedDocument::new(output))
    }

    /// Put back any template key a transformer removed.
    fn restore_template_keys(&self, result: &mut Map<String, Value>) {
        let Some(template) = &self.profile.template else {
            return;
        };
        for (key, default) in template {
            if !result.contains_key(key) {
                tracing::debug!(field = %key, "Restoring template field");
                result.insert(key.clone(), default.clone());
            }
        }
    }
}

fn compile(
    profile: &Profile,
    stage: SchemaStage,
    schema: Option<&Value>,
) -> Result<Option<SchemaValidator>, NormalizeError> {
    schema
        .map(|schema| {
            SchemaValidator::compile(schema).map_err(|source| NormalizeError::InvalidProfile {
                profile: profile.name.clone(),
                stage,
                source,
            })
        })
        .transpose()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
