//! Canonical dataset reader/writer.
//!
//! The dataset is read as raw `serde_json::Value`s rather than typed
//! records: the validator and quality checker must be able to inspect a
//! dataset that does not (yet) conform to the record schema. Record order
//! is insertion order and is preserved on every write.

use std::path::Path;

use serde_json::Value;

use glottoreg_core::report::Violation;

use crate::error::StoreError;

/// One parsed dataset line, tagged with its 1-indexed physical position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub line: usize,
    pub value: Value,
}

/// Result of a lenient read: decode failures become per-line violations
/// instead of aborting, so downstream checks still cover the rest of the
/// dataset.
#[derive(Debug, Default)]
pub struct LenientDataset {
    pub records: Vec<RawRecord>,
    pub decode_errors: Vec<Violation>,
}

/// Read the dataset, keeping per-line decode failures as violations.
/// Only I/O failures are fatal.
///
/// # Errors
///
/// Returns `StoreError::Read` when the file cannot be read.
pub fn read_lenient(path: &Path) -> Result<LenientDataset, StoreError> {
    let text = read_text(path)?;
    let mut dataset = LenientDataset::default();
    for (line, raw) in numbered_lines(&text) {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => dataset.records.push(RawRecord { line, value }),
            Err(error) => dataset
                .decode_errors
                .push(Violation::at_line(line, format!("JSON decode error: {error}"))),
        }
    }
    Ok(dataset)
}

/// Read the dataset, failing on the first undecodable line. Used where
/// every record is needed verbatim (snapshot building, merge imports).
///
/// # Errors
///
/// Returns `StoreError::Read` for I/O failures and `StoreError::Decode`
/// for the first line that is not valid JSON.
pub fn read_strict(path: &Path) -> Result<Vec<RawRecord>, StoreError> {
    let text = read_text(path)?;
    let mut records = Vec::new();
    for (line, raw) in numbered_lines(&text) {
        let value = serde_json::from_str::<Value>(raw).map_err(|source| StoreError::Decode {
            path: path.to_path_buf(),
            line,
            source,
        })?;
        records.push(RawRecord { line, value });
    }
    Ok(records)
}

/// Read the raw dataset text.
///
/// # Errors
///
/// Returns `StoreError::Read` when the file cannot be read.
pub fn read_text(path: &Path) -> Result<String, StoreError> {
    std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a full dataset atomically: records go to a temp file in the
/// destination directory via `serde-jsonlines`, which is then renamed
/// over the target. Record order is whatever the caller passes.
///
/// # Errors
///
/// Returns `StoreError::Write` when the temp file cannot be created,
/// written, or renamed into place.
pub fn write_records_atomic<T: serde::Serialize>(
    path: &Path,
    records: &[T],
) -> Result<(), StoreError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new_in("."),
    }
    .map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    serde_jsonlines::write_json_lines(tmp.path(), records).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tmp.persist(path).map_err(|error| StoreError::Write {
        path: path.to_path_buf(),
        source: error.error,
    })?;

    tracing::debug!(path = %path.display(), records = records.len(), "wrote dataset");
    Ok(())
}

/// Write arbitrary text atomically (snapshot artifact).
///
/// # Errors
///
/// Returns `StoreError::Write` when the temp file cannot be created,
/// written, or renamed into place.
pub fn write_text_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new_in("."),
    }
    .map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    std::fs::write(tmp.path(), content).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tmp.persist(path).map_err(|error| StoreError::Write {
        path: path.to_path_buf(),
        source: error.error,
    })?;
    Ok(())
}

/// Non-blank lines with 1-indexed physical numbers. Blank lines are
/// legal padding in the hand-edited store and never shift numbering.
fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !l.trim().is_empty())
}
