//! Violation reporting shared by the validator, quality checker, and
//! importer.
//!
//! The dominant contributor workflow is "fix N flagged lines in one edit
//! cycle", so checking stages accumulate every finding into a `Report`
//! instead of failing fast. Only I/O-class errors abort a run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single finding against the dataset, with its location when known.
///
/// `line` is the 1-indexed physical line in the persisted store (or the
/// source row for import findings); `field` is a dotted path into the
/// record (`links.0.url`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Violation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    pub message: String,
}

impl Violation {
    /// A finding tied to a whole line/record.
    #[must_use]
    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            field: None,
            message: message.into(),
        }
    }

    /// A finding tied to a specific field of a line/record.
    #[must_use]
    pub fn at_field(line: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// A finding about the dataset or an artifact as a whole.
    #[must_use]
    pub fn dataset(message: impl Into<String>) -> Self {
        Self {
            line: None,
            field: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "[line {line}] ")?;
        }
        if let Some(field) = &self.field {
            write!(f, "{field}: ")?;
        }
        f.write_str(&self.message)
    }
}

/// Accumulated findings from one checking stage.
///
/// Errors gate the exit code; warnings are informational and a
/// warnings-only report is still clean.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Report {
    pub errors: Vec<Violation>,
    pub warnings: Vec<Violation>,
}

impl Report {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, violation: Violation) {
        self.errors.push(violation);
    }

    pub fn warning(&mut self, violation: Violation) {
        self.warnings.push(violation);
    }

    /// Fold another stage's findings into this report, preserving order.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Clean means zero errors; warnings do not count.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Human-readable rendering: a `Warnings:` block, then an `Errors:`
    /// block, each one finding per line. Empty string when there is
    /// nothing to say.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.warnings.is_empty() {
            out.push_str("Warnings:\n");
            for warning in &self.warnings {
                out.push_str(&format!("  - {warning}\n"));
            }
        }
        if !self.errors.is_empty() {
            out.push_str("Errors:\n");
            for error in &self.errors {
                out.push_str(&format!("  - {error}\n"));
            }
        }
        out
    }
}
