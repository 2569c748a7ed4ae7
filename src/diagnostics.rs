//! Diagnostics - advisory notes attached to a normalization run.
//!
//! Diagnostics never fail a call. They are recorded in emission order and
//! surface in `_meta.diagnostics` when execution metadata is requested.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub path: String,
    /// Filled with the call's timestamp when recorded without one.
    pub timestamp: Option<String>,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            path: path.into(),
            timestamp: None,
        }
    }

    pub fn info(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, message, path)
    }

    pub fn warning(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, message, path)
    }

    pub fn error(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, message, path)
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}
