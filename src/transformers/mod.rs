//! Transformers - ordered, composable normalization steps.
//!
//! Each transformer reads the raw document and writes into the shared
//! working result. Transformers run strictly in profile order; later steps
//! may rely on fields set by earlier ones.

pub mod attributes;
pub mod core_fields;

pub use attributes::AttributesTransformer;
pub use core_fields::CoreFieldsTransformer;

use serde_json::{Map, Value};

use crate::diagnostics::Diagnostic;
use crate::normalizer::ResolvedOptions;
use crate::profiles::Profile;

/// Error type a transformer may fail with.
pub type TransformError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Mutable state shared by every transformer of one `normalize` call.
#[derive(Debug)]
pub struct WorkingState<'a> {
    /// The raw input document. Read-only.
    pub raw: &'a Map<String, Value>,
    /// Output in progress, seeded from the profile template.
    pub result: Map<String, Value>,
}

/// Per-call helper handed to transformers.
///
/// Owns the diagnostics list for the duration of the call; recording through
/// [`Context::add_diagnostic`] is the only way to append to it.
#[derive(Debug)]
pub struct Context<'a> {
    profile: &'a Profile,
    options: &'a ResolvedOptions,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Context<'a> {
    pub fn new(profile: &'a Profile, options: &'a ResolvedOptions) -> Self {
        Self {
            profile,
            options,
            diagnostics: Vec::new(),
        }
    }

    pub fn profile(&self) -> &Profile {
        self.profile
    }

    pub fn options(&self) -> &ResolvedOptions {
        self.options
    }

    pub fn add_diagnostic(&mut self, mut diagnostic: Diagnostic) {
        if diagnostic.timestamp.is_none() {
            diagnostic.timestamp = Some(self.options.timestamp.clone());
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn info(&mut self, message: impl Into<String>, path: impl Into<String>) {
        self.add_diagnostic(Diagnostic::info(message, path));
    }

    pub fn warning(&mut self, message: impl Into<String>, path: impl Into<String>) {
        self.add_diagnostic(Diagnostic::warning(message, path));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// A single normalization step.
pub trait Transformer: Send + Sync {
    fn name(&self) -> &str;
    fn transform(&self, state: &mut WorkingState<'_>, ctx: &mut Context<'_>) -> Result<(), TransformError>;
}

/// Wraps a closure as a named transformer.
pub struct FnTransformer<F> {
    name: String,
    func: F,
}

impl<F> FnTransformer<F>
where
    F: Fn(&mut WorkingState<'_>, &mut Context<'_>) -> Result<(), TransformError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Transformer for FnTransformer<F>
where
    F: Fn(&mut WorkingState<'_>, &mut Context<'_>) -> Result<(), TransformError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, state: &mut WorkingState<'_>, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        (self.func)(state, ctx)
    }
}

/// First key of `candidates` present in `source`, with its value.
pub(crate) fn first_present<'v>(
    source: &'v Map<String, Value>,
    candidates: &[&'static str],
) -> Option<(&'static str, &'v Value)> {
    candidates
        .iter()
        .find_map(|key| source.get(*key).map(|value| (*key, value)))
}
