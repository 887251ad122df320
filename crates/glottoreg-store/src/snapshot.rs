//! Web snapshot builder: the deterministic JSON-array projection of the
//! canonical dataset.
//!
//! The snapshot is a disposable cache. It preserves every field of every
//! record unchanged (the search UI filters client-side and needs full
//! fidelity) and is byte-stable: the same dataset always produces the
//! same snapshot text, so rebuilding is idempotent and staleness is a
//! plain content comparison.

use std::path::Path;

use serde_json::Value;

use glottoreg_core::report::{Report, Violation};

use crate::dataset::{self, RawRecord};
use crate::error::StoreError;

/// Render the snapshot text for a dataset: a pretty-printed JSON array
/// with a trailing newline.
///
/// # Panics
///
/// Panics if `serde_json` fails to serialize the values. Not expected in
/// practice: every value here was itself parsed from JSON.
#[must_use]
pub fn build(records: &[RawRecord]) -> String {
    let values: Vec<&Value> = records.iter().map(|r| &r.value).collect();
    let mut text = serde_json::to_string_pretty(&values)
        .expect("JSON-sourced values always serialize");
    text.push('\n');
    text
}

/// Build the snapshot from the dataset and write it atomically.
/// Returns the number of records projected.
///
/// # Errors
///
/// Fails fast on unreadable input, an undecodable dataset line, or a
/// write failure. The previous snapshot is left intact on any error.
pub fn write(dataset_path: &Path, snapshot_path: &Path) -> Result<usize, StoreError> {
    let records = dataset::read_strict(dataset_path)?;
    let text = build(&records);
    dataset::write_text_atomic(snapshot_path, &text)?;
    tracing::debug!(
        snapshot = %snapshot_path.display(),
        records = records.len(),
        "wrote web snapshot"
    );
    Ok(records.len())
}

/// Compare the on-disk snapshot against a freshly built one.
///
/// This is a content equality check, never a timestamp comparison, so
/// hand-edit drift in either artifact is caught. Differences are
/// reported per `resource_id` (missing / unexpected / differing) with
/// the dataset line number where one exists.
///
/// # Errors
///
/// Fails fast on unreadable input or an undecodable dataset line. A
/// *missing* snapshot file is not fatal; it is reported as a violation,
/// since "never built" is just the extreme case of stale.
pub fn check(dataset_path: &Path, snapshot_path: &Path) -> Result<Report, StoreError> {
    let records = dataset::read_strict(dataset_path)?;
    check_records(&records, snapshot_path)
}

/// Snapshot sync check against already-loaded dataset records. Used by
/// the quality checker, which reads leniently and must keep going even
/// when some dataset lines fail to decode.
///
/// # Errors
///
/// Fails fast on an unreadable (but present) snapshot file.
pub fn check_records(records: &[RawRecord], snapshot_path: &Path) -> Result<Report, StoreError> {
    let snapshot_text = match std::fs::read_to_string(snapshot_path) {
        Ok(text) => text,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            let mut report = Report::new();
            report.error(Violation::dataset(format!(
                "missing snapshot file: {}",
                snapshot_path.display()
            )));
            return Ok(report);
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: snapshot_path.to_path_buf(),
                source,
            });
        }
    };

    Ok(compare(records, &snapshot_text))
}

/// Diff a dataset against snapshot text.
#[must_use]
pub fn compare(records: &[RawRecord], snapshot_text: &str) -> Report {
    let mut report = Report::new();

    let snapshot: Value = match serde_json::from_str(snapshot_text) {
        Ok(value) => value,
        Err(error) => {
            report.error(Violation::dataset(format!(
                "snapshot JSON parse error: {error}"
            )));
            return report;
        }
    };
    let Some(snapshot_items) = snapshot.as_array() else {
        report.error(Violation::dataset("snapshot is not a JSON array"));
        return report;
    };

    let fresh: Vec<&Value> = records.iter().map(|r| &r.value).collect();
    if snapshot_items.iter().collect::<Vec<_>>() == fresh {
        return report;
    }

    // Not byte-equivalent: pinpoint the drift per resource_id.
    let mut snapshot_by_id = std::collections::HashMap::new();
    for item in snapshot_items {
        if let Some(id) = id_of(item) {
            snapshot_by_id.entry(id).or_insert(item);
        }
    }

    let mut dataset_ids = std::collections::HashSet::new();
    let mut pinpointed = false;
    for record in records {
        let Some(id) = id_of(&record.value) else {
            continue;
        };
        dataset_ids.insert(id);
        match snapshot_by_id.get(id) {
            None => {
                pinpointed = true;
                report.error(Violation::at_line(
                    record.line,
                    format!("resource_id '{id}' missing from snapshot"),
                ));
            }
            Some(item) if **item != record.value => {
                pinpointed = true;
                report.error(Violation::at_line(
                    record.line,
                    format!("snapshot content differs for resource_id '{id}'"),
                ));
            }
            Some(_) => {}
        }
    }
    for id in snapshot_by_id.keys() {
        if !dataset_ids.contains(id) {
            pinpointed = true;
            report.error(Violation::dataset(format!(
                "unexpected resource_id '{id}' in snapshot"
            )));
        }
    }

    // Same id sets and contents but different order, or records without
    // ids: still stale.
    if !pinpointed {
        report.error(Violation::dataset(
            "snapshot does not match canonical dataset",
        ));
    }
    report
}

fn id_of(value: &Value) -> Option<&str> {
    value.get("resource_id").and_then(Value::as_str)
}
