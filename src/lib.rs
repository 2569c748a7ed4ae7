//! NFT Metadata Normalizer - Core
//!
//! Turns loosely ERC-721/1155 shaped metadata into one canonical document.
//!
//! # Pipeline
//! 1. Input schema check
//! 2. Template seeding
//! 3. Transformers, in profile order
//! 4. Output schema check
//! 5. Content hash (`hash` excluded from its own input)
//! 6. Execution metadata (`_meta`, never hashed)

use std::sync::OnceLock;

use serde_json::Value;

pub mod batch;
pub mod diagnostics;
pub mod document;
pub mod hashing;
pub mod logging;
pub mod normalizer;
pub mod output;
pub mod profiles;
pub mod schemas;
pub mod sources;
pub mod transformers;
pub mod validation;

pub use batch::{BatchFailure, BatchReport, BatchSuccess, SourceDocument};
pub use diagnostics::{Diagnostic, DiagnosticLevel};
pub use document::{ExecutionMeta, NormalizedDocument, ProfileRef};
pub use hashing::{canonical_json, compute_content_hash, sha256_hex};
pub use normalizer::{NormalizeError, NormalizeOptions, Normalizer, ResolvedOptions, SchemaStage};
pub use profiles::{default_profile, Profile};
pub use transformers::{Context, FnTransformer, TransformError, Transformer, WorkingState};
pub use validation::{SchemaValidator, SchemaViolation, ValidationError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

static DEFAULT_NORMALIZER: OnceLock<Normalizer> = OnceLock::new();

/// Process-wide normalizer for the default profile, built on first use.
pub fn default_normalizer() -> Result<&'static Normalizer, NormalizeError> {
    if let Some(normalizer) = DEFAULT_NORMALIZER.get() {
        return Ok(normalizer);
    }
    let normalizer = Normalizer::new(default_profile())?;
    Ok(DEFAULT_NORMALIZER.get_or_init(|| normalizer))
}

/// Normalize with the default profile.
pub fn normalize(raw: &Value, options: &NormalizeOptions) -> Result<NormalizedDocument, NormalizeError> {
    default_normalizer()?.normalize(raw, options)
}
