//! Dataset validator: every canonical-dataset line against the record
//! schema.
//!
//! Line numbers are 1-indexed physical positions in the persisted store,
//! because the fix workflow is "open the file at the flagged line". The
//! validator never stops at the first error: a contributor fixes the
//! whole batch in one edit cycle.

use serde_json::Value;

use glottoreg_core::report::{Report, Violation};

use crate::error::SchemaError;
use crate::registry::SchemaRegistry;

/// Per-record schema validation over a whole dataset.
pub struct Validator {
    compiled: jsonschema::Validator,
}

impl Validator {
    /// Compile the `resource` schema from the registry.
    ///
    /// # Errors
    ///
    /// Returns an error when the registry has no `resource` schema or it
    /// fails to compile.
    pub fn new(registry: &SchemaRegistry) -> Result<Self, SchemaError> {
        Ok(Self {
            compiled: registry.compile("resource")?,
        })
    }

    /// Validate raw dataset text, one JSON record per line.
    ///
    /// Blank lines are skipped. A line that fails to parse as JSON is
    /// itself a violation (with its line number), not a fatal error, so
    /// the rest of the dataset still gets checked.
    #[must_use]
    pub fn validate_text(&self, text: &str) -> Report {
        let mut report = Report::new();
        for (line, raw) in text.lines().enumerate().map(|(i, l)| (i + 1, l)) {
            if raw.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(raw) {
                Ok(value) => self.validate_value(line, &value, &mut report),
                Err(error) => {
                    report.error(Violation::at_line(line, format!("JSON decode error: {error}")));
                }
            }
        }
        report
    }

    /// Validate one already-parsed record, appending findings to `report`.
    pub fn validate_value(&self, line: usize, value: &Value, report: &mut Report) {
        for error in self.compiled.iter_errors(value) {
            let pointer = error.instance_path.to_string();
            let message = error.to_string();
            if pointer.is_empty() {
                report.error(Violation::at_line(line, message));
            } else {
                let field = pointer.trim_start_matches('/').replace('/', ".");
                report.error(Violation::at_field(line, field, message));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::new(&SchemaRegistry::new()).expect("resource schema should compile")
    }

    const VALID_LINE: &str = r#"{"resource_id":"demo-corpus","glottocode":"stan1293","title":"Demo","resource_type":"corpus","access":{"level":"open"},"links":[{"kind":"landing","url":"https://example.org/demo"}]}"#;

    #[test]
    fn clean_dataset_produces_empty_report() {
        let text = format!("{VALID_LINE}\n\n{VALID_LINE}\n");
        let report = validator().validate_text(&text);
        assert!(report.is_clean());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn decode_error_is_reported_with_line_number() {
        let text = format!("{VALID_LINE}\nnot json at all\n{VALID_LINE}\n");
        let report = validator().validate_text(&text);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].line, Some(2));
        assert!(report.errors[0].message.contains("JSON decode error"));
    }

    #[test]
    fn violations_carry_field_paths() {
        let bad = VALID_LINE.replace("stan1293", "NOPE");
        let report = validator().validate_text(&bad);
        assert!(!report.is_clean());
        assert!(
            report
                .errors
                .iter()
                .any(|v| v.field.as_deref() == Some("glottocode"))
        );
    }

    #[test]
    fn all_lines_are_checked_not_just_the_first() {
        let bad = VALID_LINE.replace("stan1293", "NOPE");
        let text = format!("{bad}\n{VALID_LINE}\n{bad}\n");
        let report = validator().validate_text(&text);
        let lines: Vec<Option<usize>> = report.errors.iter().map(|v| v.line).collect();
        assert!(lines.contains(&Some(1)));
        assert!(lines.contains(&Some(3)));
        assert!(!lines.contains(&Some(2)));
    }

    #[test]
    fn nested_violation_points_into_links() {
        let bad = VALID_LINE.replace("\"landing\"", "\"homepage\"");
        let report = validator().validate_text(&bad);
        assert!(!report.is_clean());
        assert!(
            report
                .errors
                .iter()
                .any(|v| v.field.as_deref().is_some_and(|f| f.starts_with("links")))
        );
    }

    #[test]
    fn blank_lines_do_not_shift_numbering() {
        let bad = VALID_LINE.replace("stan1293", "NOPE");
        let text = format!("\n\n{bad}\n");
        let report = validator().validate_text(&text);
        assert_eq!(report.errors[0].line, Some(3));
    }
}
