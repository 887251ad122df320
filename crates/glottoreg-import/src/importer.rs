//! Batch import of CSV/TSV catalog exports into the canonical dataset.
//!
//! The importer is the bulk-ingest path; the dataset stays hand-editable
//! afterwards. Two guarantees shape everything here:
//!
//! - the destination is written atomically, and not at all when the
//!   batch aborts, so a failed import never corrupts the store;
//! - in merge mode, untouched dataset lines are carried over verbatim,
//!   never re-serialized, so a merge touches exactly the lines it
//!   replaces.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use glottoreg_core::record::Record;
use glottoreg_core::report::{Report, Violation};
use glottoreg_schema::{SchemaRegistry, Validator};
use glottoreg_store::dataset;

use crate::columns::HeaderMap;
use crate::error::ImportError;
use crate::row::{self, Defaults, RowValues};

/// What to do with a row whose `resource_id` already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Every row becomes a new trailing record.
    #[default]
    Append,
    /// Rows matching an existing `resource_id` replace that record in
    /// place; the rest append.
    Merge,
}

/// What to do when a row cannot be turned into a valid record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowErrorPolicy {
    /// Report the row and import the rest.
    Skip,
    /// Report and fail the whole batch; the destination is untouched.
    #[default]
    Abort,
}

/// Input field delimiter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delimiter {
    /// By file extension: `.tsv` means tab, anything else comma.
    #[default]
    Auto,
    Comma,
    Tab,
}

impl Delimiter {
    #[must_use]
    pub fn resolve(self, input: &Path) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Tab => b'\t',
            Self::Auto => match input.extension().and_then(|ext| ext.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
                _ => b',',
            },
        }
    }
}

/// Knobs for one import run.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub mode: ImportMode,
    pub on_row_error: RowErrorPolicy,
    pub delimiter: Delimiter,
    /// Reject the input when it carries unrecognized columns.
    pub strict_columns: bool,
    /// Check every candidate record against the schema registry before
    /// commit.
    pub validate: bool,
    /// Schema-check the entire resulting dataset (existing records
    /// included) before the write; any violation fails the batch and
    /// leaves the destination untouched.
    pub validate_dataset: bool,
    pub defaults: Defaults,
}

/// What one import run did.
#[derive(Debug)]
pub struct ImportOutcome {
    pub appended: usize,
    pub updated: usize,
    pub skipped: usize,
    /// Whether the destination was (re)written.
    pub written: bool,
    pub report: Report,
}

impl ImportOutcome {
    fn unwritten(skipped: usize, report: Report) -> Self {
        Self {
            appended: 0,
            updated: 0,
            skipped,
            written: false,
            report,
        }
    }
}

/// Run one import: read the tabular input, build candidate records, and
/// commit them to the dataset per the options.
///
/// Row-level problems land in the outcome's report and follow the
/// row-error policy; only I/O-class failures return `Err`.
///
/// # Errors
///
/// Returns an error when the input cannot be read or has no header row,
/// when the destination cannot be read or written, or (in merge mode)
/// when an existing dataset line is not valid JSON.
///
/// # Panics
///
/// Panics if a built record fails to serialize. Not expected in
/// practice: records contain only JSON-representable fields.
pub fn import(
    input: &Path,
    dataset_path: &Path,
    options: &ImportOptions,
) -> Result<ImportOutcome, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter.resolve(input))
        .flexible(true)
        .from_path(input)
        .map_err(|source| ImportError::Input {
            path: input.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| ImportError::Input {
            path: input.to_path_buf(),
            source,
        })?
        .clone();
    if headers.iter().all(|header| header.trim().is_empty()) {
        return Err(ImportError::MissingHeader {
            path: input.to_path_buf(),
        });
    }

    let header_map = HeaderMap::from_headers(headers.iter());
    let mut report = Report::new();

    if options.strict_columns && !header_map.unknown.is_empty() {
        for name in &header_map.unknown {
            report.error(Violation::dataset(format!("unknown column '{name}'")));
        }
        return Ok(ImportOutcome::unwritten(0, report));
    }
    for name in &header_map.unknown {
        report.warning(Violation::dataset(format!("ignoring unknown column '{name}'")));
    }
    for name in &header_map.duplicates {
        report.warning(Violation::dataset(format!(
            "ignoring duplicate column '{name}'"
        )));
    }

    let validator = if options.validate || options.validate_dataset {
        Some(Validator::new(&SchemaRegistry::new())?)
    } else {
        None
    };

    let mut candidates: Vec<(usize, Record)> = Vec::new();
    let mut candidate_index: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;
    let mut aborted = false;
    let mut last_line = 1usize;

    for result in reader.records() {
        let raw = match result {
            Ok(raw) => raw,
            Err(error) => {
                let message = format!("row parse error: {error}");
                let violation = match row_number(error.position()) {
                    Some(line) => Violation::at_line(line, message),
                    None => Violation::dataset(message),
                };
                route_row_failure(
                    options.on_row_error,
                    vec![violation],
                    &mut report,
                    &mut skipped,
                    &mut aborted,
                );
                continue;
            }
        };
        let line = row_number(raw.position()).unwrap_or(last_line + 1);
        last_line = line;

        let mut values = RowValues::new();
        for (index, cell) in raw.iter().enumerate() {
            if let Some(column) = header_map.get(index) {
                let cell = cell.trim();
                if !cell.is_empty() {
                    values.entry(column).or_insert_with(|| cell.to_string());
                }
            }
        }

        let record = match row::build_record(line, &values, &options.defaults, &mut report) {
            Ok(record) => record,
            Err(violations) => {
                route_row_failure(
                    options.on_row_error,
                    violations,
                    &mut report,
                    &mut skipped,
                    &mut aborted,
                );
                continue;
            }
        };

        if options.validate {
            if let Some(validator) = &validator {
                let value = serde_json::to_value(&record)
                    .expect("records contain only JSON-representable fields");
                let mut scratch = Report::new();
                validator.validate_value(line, &value, &mut scratch);
                if !scratch.is_clean() {
                    route_row_failure(
                        options.on_row_error,
                        scratch.errors,
                        &mut report,
                        &mut skipped,
                        &mut aborted,
                    );
                    continue;
                }
            }
        }

        if options.mode == ImportMode::Merge {
            if let Some(&earlier) = candidate_index.get(&record.resource_id) {
                report.warning(Violation::at_line(
                    line,
                    format!(
                        "row overrides earlier batch row for resource_id '{}'",
                        record.resource_id
                    ),
                ));
                candidates[earlier] = (line, record);
                continue;
            }
            candidate_index.insert(record.resource_id.clone(), candidates.len());
        }
        candidates.push((line, record));
    }

    if aborted {
        return Ok(ImportOutcome::unwritten(skipped, report));
    }
    if candidates.is_empty() {
        return Ok(ImportOutcome::unwritten(skipped, report));
    }

    let staged = stage(dataset_path, options.mode, &candidates)?;

    if options.validate_dataset {
        if let Some(validator) = &validator {
            let dataset_report = validator.validate_text(&join_lines(&staged.lines));
            if !dataset_report.is_clean() {
                report.merge(dataset_report);
                return Ok(ImportOutcome::unwritten(skipped, report));
            }
        }
    }

    if staged.fresh {
        let records: Vec<&Record> = candidates.iter().map(|(_, record)| record).collect();
        dataset::write_records_atomic(dataset_path, &records)?;
    } else {
        dataset::write_text_atomic(dataset_path, &join_lines(&staged.lines))?;
    }

    tracing::info!(
        input = %input.display(),
        dataset = %dataset_path.display(),
        appended = staged.appended,
        updated = staged.updated,
        skipped,
        "import complete"
    );
    Ok(ImportOutcome {
        appended: staged.appended,
        updated: staged.updated,
        skipped,
        written: true,
        report,
    })
}

/// The dataset content an import is about to write.
struct Staged {
    lines: Vec<String>,
    appended: usize,
    updated: usize,
    /// No destination file existed yet.
    fresh: bool,
}

/// Compute the resulting dataset without writing it, so the whole-dataset
/// validation gate can run first. Fresh datasets are all candidates;
/// existing ones are spliced as text so untouched lines keep their exact
/// bytes.
fn stage(
    dataset_path: &Path,
    mode: ImportMode,
    candidates: &[(usize, Record)],
) -> Result<Staged, ImportError> {
    if !dataset_path.exists() {
        let lines = candidates
            .iter()
            .map(|(_, record)| serialize(record))
            .collect();
        return Ok(Staged {
            lines,
            appended: candidates.len(),
            updated: 0,
            fresh: true,
        });
    }

    let text = dataset::read_text(dataset_path)?;
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();

    let line_by_id: HashMap<String, usize> = if mode == ImportMode::Merge {
        dataset::read_strict(dataset_path)?
            .iter()
            .filter_map(|record| {
                record
                    .value
                    .get("resource_id")
                    .and_then(Value::as_str)
                    .map(|id| (id.to_string(), record.line))
            })
            .collect()
    } else {
        HashMap::new()
    };

    let mut appended = 0usize;
    let mut updated = 0usize;
    for (_, record) in candidates {
        let serialized = serialize(record);
        match line_by_id.get(&record.resource_id) {
            Some(&line) if mode == ImportMode::Merge => {
                lines[line - 1] = serialized;
                updated += 1;
            }
            _ => {
                lines.push(serialized);
                appended += 1;
            }
        }
    }

    Ok(Staged {
        lines,
        appended,
        updated,
        fresh: false,
    })
}

fn serialize(record: &Record) -> String {
    serde_json::to_string(record).expect("records contain only JSON-representable fields")
}

fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn route_row_failure(
    policy: RowErrorPolicy,
    violations: Vec<Violation>,
    report: &mut Report,
    skipped: &mut usize,
    aborted: &mut bool,
) {
    match policy {
        RowErrorPolicy::Skip => {
            *skipped += 1;
            for violation in violations {
                report.warning(violation);
            }
        }
        RowErrorPolicy::Abort => {
            *aborted = true;
            for violation in violations {
                report.error(violation);
            }
        }
    }
}

/// Physical 1-indexed source line of a record (the header is line 1).
/// `None` when csv has no position to offer.
fn row_number(position: Option<&csv::Position>) -> Option<usize> {
    position.map(|p| usize::try_from(p.line()).unwrap_or(usize::MAX))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const HEADER: &str = "resource_id,glottocode,title,resource_type,license,landing_url";

    fn write_input(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn append_creates_dataset_with_normalized_rows() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            &dir,
            "batch.csv",
            &format!(
                "{HEADER}\nDemo Corpus,stan1293,Demo,corpus,CC-BY-4.0,https://example.org/demo\n\
                 other_lexicon,russ1263,Other,lexicon,CC0-1.0,https://example.org/other\n"
            ),
        );
        let dataset = dir.path().join("registry.jsonl");

        let outcome = import(&input, &dataset, &ImportOptions::default()).unwrap();
        assert!(outcome.written);
        assert_eq!(outcome.appended, 2);
        assert!(outcome.report.is_clean());

        let lines = read_lines(&dataset);
        assert_eq!(lines.len(), 2);
        let first: Record = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first.resource_id, "demo-corpus");
        let second: Record = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(second.resource_id, "other-lexicon");
    }

    #[test]
    fn tsv_extension_switches_to_tab_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            &dir,
            "batch.tsv",
            &format!(
                "{}\ndemo-corpus\tstan1293\tDemo\tcorpus\tCC-BY-4.0\thttps://example.org/demo\n",
                HEADER.replace(',', "\t")
            ),
        );
        let dataset = dir.path().join("registry.jsonl");

        let outcome = import(&input, &dataset, &ImportOptions::default()).unwrap();
        assert_eq!(outcome.appended, 1);
        assert!(outcome.report.is_clean());
    }

    #[test]
    fn merge_replaces_matching_line_and_keeps_others_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let untouched = r#"{"resource_id":"keep-me","glottocode":"russ1263","title":"Keep","resource_type":"lexicon","access":{"level":"open"},"links":[{"kind":"landing","url":"https://example.org/keep"}]}"#;
        let replaced = r#"{"resource_id":"demo-corpus","glottocode":"stan1293","title":"Old title","resource_type":"corpus","access":{"level":"open"},"links":[{"kind":"landing","url":"https://example.org/demo"}]}"#;
        let dataset = write_input(&dir, "registry.jsonl", &format!("{untouched}\n{replaced}\n"));
        let input = write_input(
            &dir,
            "batch.csv",
            &format!("{HEADER}\ndemo-corpus,stan1293,New title,corpus,CC-BY-4.0,https://example.org/demo\n"),
        );

        let options = ImportOptions {
            mode: ImportMode::Merge,
            ..ImportOptions::default()
        };
        let outcome = import(&input, &dataset, &options).unwrap();
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.appended, 0);

        let lines = read_lines(&dataset);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], untouched);
        let merged: Record = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(merged.title, "New title");
    }

    #[test]
    fn merge_appends_rows_without_a_match() {
        let dir = tempfile::tempdir().unwrap();
        let existing = r#"{"resource_id":"keep-me","glottocode":"russ1263","title":"Keep","resource_type":"lexicon","access":{"level":"open"},"links":[{"kind":"landing","url":"https://example.org/keep"}]}"#;
        let dataset = write_input(&dir, "registry.jsonl", &format!("{existing}\n"));
        let input = write_input(
            &dir,
            "batch.csv",
            &format!("{HEADER}\nnew-corpus,stan1293,New,corpus,CC-BY-4.0,https://example.org/new\n"),
        );

        let options = ImportOptions {
            mode: ImportMode::Merge,
            ..ImportOptions::default()
        };
        let outcome = import(&input, &dataset, &options).unwrap();
        assert_eq!(outcome.appended, 1);
        assert_eq!(outcome.updated, 0);
        assert_eq!(read_lines(&dataset).len(), 2);
    }

    #[test]
    fn later_batch_row_wins_in_merge_with_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            &dir,
            "batch.csv",
            &format!(
                "{HEADER}\ndemo-corpus,stan1293,First,corpus,CC-BY-4.0,https://example.org/demo\n\
                 demo-corpus,stan1293,Second,corpus,CC-BY-4.0,https://example.org/demo\n"
            ),
        );
        let dataset = dir.path().join("registry.jsonl");

        let options = ImportOptions {
            mode: ImportMode::Merge,
            ..ImportOptions::default()
        };
        let outcome = import(&input, &dataset, &options).unwrap();
        assert_eq!(outcome.appended, 1);
        assert_eq!(outcome.report.warnings.len(), 1);
        assert!(outcome.report.warnings[0].message.contains("overrides"));

        let lines = read_lines(&dataset);
        let record: Record = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(record.title, "Second");
    }

    #[test]
    fn skip_policy_imports_good_rows_and_reports_bad_ones() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            &dir,
            "batch.csv",
            &format!(
                "{HEADER}\ngood-corpus,stan1293,Good,corpus,CC-BY-4.0,https://example.org/good\n\
                 bad-corpus,NOPE,Bad,corpus,CC-BY-4.0,https://example.org/bad\n"
            ),
        );
        let dataset = dir.path().join("registry.jsonl");

        let options = ImportOptions {
            on_row_error: RowErrorPolicy::Skip,
            ..ImportOptions::default()
        };
        let outcome = import(&input, &dataset, &options).unwrap();
        assert!(outcome.written);
        assert_eq!(outcome.appended, 1);
        assert_eq!(outcome.skipped, 1);
        assert!(outcome.report.is_clean());
        assert!(
            outcome
                .report
                .warnings
                .iter()
                .any(|v| v.line == Some(3) && v.field.as_deref() == Some("glottocode"))
        );
        assert_eq!(read_lines(&dataset).len(), 1);
    }

    #[test]
    fn abort_policy_leaves_destination_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let existing = r#"{"resource_id":"keep-me"}"#;
        let dataset = write_input(&dir, "registry.jsonl", &format!("{existing}\n"));
        let input = write_input(
            &dir,
            "batch.csv",
            &format!(
                "{HEADER}\ngood-corpus,stan1293,Good,corpus,CC-BY-4.0,https://example.org/good\n\
                 bad-corpus,NOPE,Bad,corpus,CC-BY-4.0,https://example.org/bad\n"
            ),
        );

        let outcome = import(&input, &dataset, &ImportOptions::default()).unwrap();
        assert!(!outcome.written);
        assert!(!outcome.report.is_clean());
        assert_eq!(read_lines(&dataset), vec![existing.to_string()]);
    }

    #[test]
    fn strict_columns_rejects_unknown_headers() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            &dir,
            "batch.csv",
            &format!("{HEADER},popularity\ndemo-corpus,stan1293,Demo,corpus,CC-BY-4.0,https://example.org/demo,9000\n"),
        );
        let dataset = dir.path().join("registry.jsonl");

        let options = ImportOptions {
            strict_columns: true,
            ..ImportOptions::default()
        };
        let outcome = import(&input, &dataset, &options).unwrap();
        assert!(!outcome.written);
        assert!(
            outcome
                .report
                .errors
                .iter()
                .any(|v| v.message.contains("popularity"))
        );
        assert!(!dataset.exists());
    }

    #[test]
    fn unknown_columns_warn_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            &dir,
            "batch.csv",
            &format!("{HEADER},popularity\ndemo-corpus,stan1293,Demo,corpus,CC-BY-4.0,https://example.org/demo,9000\n"),
        );
        let dataset = dir.path().join("registry.jsonl");

        let outcome = import(&input, &dataset, &ImportOptions::default()).unwrap();
        assert!(outcome.written);
        assert!(
            outcome
                .report
                .warnings
                .iter()
                .any(|v| v.message.contains("popularity"))
        );
    }

    #[test]
    fn validate_accepts_wellformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            &dir,
            "batch.csv",
            &format!("{HEADER}\ndemo-corpus,stan1293,Demo,corpus,CC-BY-4.0,https://example.org/demo\n"),
        );
        let dataset = dir.path().join("registry.jsonl");

        let options = ImportOptions {
            validate: true,
            ..ImportOptions::default()
        };
        let outcome = import(&input, &dataset, &options).unwrap();
        assert!(outcome.written);
        assert!(outcome.report.is_clean());
    }

    #[test]
    fn empty_input_has_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "batch.csv", "");
        let dataset = dir.path().join("registry.jsonl");

        let err = import(&input, &dataset, &ImportOptions::default()).unwrap_err();
        assert!(matches!(err, ImportError::MissingHeader { .. }));
    }

    #[test]
    fn validate_gates_candidates_not_existing_records() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = r#"{"resource_id":"legacy","glottocode":"NOPE","links":[]}"#;
        let dataset = write_input(&dir, "registry.jsonl", &format!("{legacy}\n"));
        let input = write_input(
            &dir,
            "batch.csv",
            &format!("{HEADER}\ndemo-corpus,stan1293,Demo,corpus,CC-BY-4.0,https://example.org/demo\n"),
        );

        let options = ImportOptions {
            validate: true,
            ..ImportOptions::default()
        };
        let outcome = import(&input, &dataset, &options).unwrap();
        assert!(outcome.written);
        assert!(outcome.report.is_clean());
        assert_eq!(read_lines(&dataset).len(), 2);
    }

    #[test]
    fn validate_dataset_blocks_commit_when_result_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let legacy = r#"{"resource_id":"legacy","glottocode":"NOPE","links":[]}"#;
        let dataset = write_input(&dir, "registry.jsonl", &format!("{legacy}\n"));
        let input = write_input(
            &dir,
            "batch.csv",
            &format!("{HEADER}\ndemo-corpus,stan1293,Demo,corpus,CC-BY-4.0,https://example.org/demo\n"),
        );

        let options = ImportOptions {
            validate_dataset: true,
            ..ImportOptions::default()
        };
        let outcome = import(&input, &dataset, &options).unwrap();
        assert!(!outcome.written);
        assert!(!outcome.report.is_clean());
        assert!(outcome.report.errors.iter().any(|v| v.line == Some(1)));
        assert_eq!(read_lines(&dataset), vec![legacy.to_string()]);
    }

    #[test]
    fn validate_dataset_passes_a_clean_result() {
        let dir = tempfile::tempdir().unwrap();
        let existing = r#"{"resource_id":"keep-me","glottocode":"russ1263","title":"Keep","resource_type":"lexicon","access":{"level":"open"},"links":[{"kind":"landing","url":"https://example.org/keep"}]}"#;
        let dataset = write_input(&dir, "registry.jsonl", &format!("{existing}\n"));
        let input = write_input(
            &dir,
            "batch.csv",
            &format!("{HEADER}\ndemo-corpus,stan1293,Demo,corpus,CC-BY-4.0,https://example.org/demo\n"),
        );

        let options = ImportOptions {
            validate_dataset: true,
            ..ImportOptions::default()
        };
        let outcome = import(&input, &dataset, &options).unwrap();
        assert!(outcome.written);
        assert!(outcome.report.is_clean());
        assert_eq!(read_lines(&dataset).len(), 2);
    }

    #[test]
    fn row_number_requires_a_position() {
        assert_eq!(row_number(None), None);
        let mut position = csv::Position::new();
        position.set_line(3);
        assert_eq!(row_number(Some(&position)), Some(3));
    }
}
