//! Batch processing.
//!
//! Every document is normalized on its own: a failure is recorded next to
//! its source and never stops the remaining documents.

use serde_json::Value;

use crate::document::NormalizedDocument;
use crate::normalizer::{NormalizeError, NormalizeOptions, Normalizer};

/// A raw document together with where it came from.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub id: String,
    /// Label recorded as `_meta.source`.
    pub source: String,
    pub payload: Value,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, source: impl Into<String>, payload: Value) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            payload,
        }
    }
}

#[derive(Debug)]
pub struct BatchSuccess {
    pub id: String,
    pub source: String,
    pub normalized: NormalizedDocument,
}

#[derive(Debug)]
pub struct BatchFailure {
    pub id: String,
    pub source: String,
    pub error: NormalizeError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outputs: Vec<BatchSuccess>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outputs.len() + self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One-line summary, e.g. `Processed: 3 | normalized: 2 | failed: 1`.
    pub fn summary(&self, validate_only: bool) -> String {
        let mut parts = vec![
            format!("Processed: {}", self.total()),
            format!("normalized: {}", self.outputs.len()),
            format!("failed: {}", self.failures.len()),
        ];
        if validate_only {
            parts.push("(validate only)".to_string());
        }
        parts.join(" | ")
    }
}

impl Normalizer {
    /// Normalize each document in order, labelling it with its own source.
    pub fn normalize_batch<I>(&self, documents: I, options: &NormalizeOptions) -> BatchReport
    where
        I: IntoIterator<Item = SourceDocument>,
    {
        let mut report = BatchReport::default();
        for document in documents {
            let opts = options.clone().with_source(document.source.clone());
            match self.normalize(&document.payload, &opts) {
                Ok(normalized) => report.outputs.push(BatchSuccess {
                    id: document.id,
                    source: document.source,
                    normalized,
                }),
                Err(error) => {
                    tracing::warn!(
                        source = %document.source,
                        code = error.code(),
                        error = %error,
                        "Document failed normalization"
                    );
                    report.failures.push(BatchFailure {
                        id: document.id,
                        source: document.source,
                        error,
                    });
                }
            }
        }
        tracing::info!(
            normalized = report.outputs.len(),
            failed = report.failures.len(),
            "Batch complete"
        );
        report
    }
}
