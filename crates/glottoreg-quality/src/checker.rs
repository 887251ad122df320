//! The quality rule set.
//!
//! Errors gate the merge; warnings are advisory. The checker carries its
//! notion of "today" so the future-date rule is testable.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde_json::Value;

use glottoreg_core::report::{Report, Violation};
use glottoreg_store::dataset::{self, RawRecord};
use glottoreg_store::{StoreError, snapshot};

/// Fields whose values are lists that should not repeat.
const LIST_FIELDS: [&str; 5] = ["formats", "annotation_layers", "domain", "modality", "tags"];

pub struct QualityChecker {
    today: NaiveDate,
}

impl QualityChecker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Pin "today" for the future-date rule.
    #[must_use]
    pub const fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Check a dataset file and, when given, its snapshot.
    ///
    /// Undecodable dataset lines become violations; only I/O failures
    /// are fatal.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` when the dataset (or a present snapshot
    /// file) cannot be read.
    pub fn check(
        &self,
        dataset_path: &Path,
        snapshot_path: Option<&Path>,
    ) -> Result<Report, StoreError> {
        let loaded = dataset::read_lenient(dataset_path)?;
        let mut report = Report::new();
        report.errors.extend(loaded.decode_errors);
        report.merge(self.check_records(&loaded.records));

        if let Some(snapshot_path) = snapshot_path {
            report.merge(snapshot::check_records(&loaded.records, snapshot_path)?);
        }
        Ok(report)
    }

    /// Run every cross-record rule over already-loaded records.
    #[must_use]
    pub fn check_records(&self, records: &[RawRecord]) -> Report {
        let mut report = Report::new();
        check_unique_ids(records, &mut report);
        for record in records {
            check_links(record, &mut report);
            check_access(record, &mut report);
            self.check_dates(record, &mut report);
            check_list_duplicates(record, &mut report);
            check_license(record, &mut report);
        }
        report
    }

    fn check_dates(&self, record: &RawRecord, report: &mut Report) {
        let created = date_field(record, &record.value, "created", report);
        let updated = date_field(record, &record.value, "updated", report);
        if let (Some(created), Some(updated)) = (created, updated) {
            if updated < created {
                report.error(Violation::at_field(
                    record.line,
                    "updated",
                    format!("updated ({updated}) precedes created ({created})"),
                ));
            }
        }

        let last_verified = record
            .value
            .get("provenance")
            .map(|provenance| date_field(record, provenance, "last_verified", report))
            .unwrap_or_default();
        if let Some(last_verified) = last_verified {
            if let Some(created) = created.filter(|created| last_verified < *created) {
                report.error(Violation::at_field(
                    record.line,
                    "provenance.last_verified",
                    format!("last_verified ({last_verified}) precedes created ({created})"),
                ));
            }
            if last_verified > self.today {
                report.error(Violation::at_field(
                    record.line,
                    "provenance.last_verified",
                    format!("last_verified ({last_verified}) is in the future"),
                ));
            }
        }
    }
}

impl Default for QualityChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Rule 1: no two records share a `resource_id`. One violation per
/// duplicated id, naming every offending line.
fn check_unique_ids(records: &[RawRecord], report: &mut Report) {
    let mut lines_by_id: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for record in records {
        if let Some(id) = record.value.get("resource_id").and_then(Value::as_str) {
            lines_by_id.entry(id).or_default().push(record.line);
        }
    }
    for (id, lines) in lines_by_id {
        if lines.len() > 1 {
            let listed = lines
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            report.error(Violation::dataset(format!(
                "duplicate resource_id '{id}' at lines {listed}"
            )));
        }
    }
}

/// Rule 2: at least one landing link with a well-formed URL
/// (scheme + host). Non-https URLs anywhere are a warning.
fn check_links(record: &RawRecord, report: &mut Report) {
    let links = record
        .value
        .get("links")
        .and_then(Value::as_array)
        .filter(|links| !links.is_empty());
    let Some(links) = links else {
        report.error(Violation::at_field(
            record.line,
            "links",
            "missing links array",
        ));
        return;
    };

    let mut has_landing = false;
    for link in links {
        let kind = link.get("kind").and_then(Value::as_str);
        let url = link.get("url").and_then(Value::as_str).unwrap_or_default();

        if !url.is_empty() && !url.starts_with("https://") {
            report.warning(Violation::at_line(
                record.line,
                format!("non-https link: {url}"),
            ));
        }

        if kind == Some("landing") {
            has_landing = true;
            match url::Url::parse(url) {
                Ok(parsed) if parsed.has_host() => {}
                Ok(_) => report.error(Violation::at_field(
                    record.line,
                    "links",
                    format!("landing link url has no host: {url}"),
                )),
                Err(error) => report.error(Violation::at_field(
                    record.line,
                    "links",
                    format!("landing link url is not well-formed: {url} ({error})"),
                )),
            }
        }
    }

    if !has_landing {
        report.error(Violation::at_field(
            record.line,
            "links",
            "missing landing link",
        ));
    }
}

/// Public-only policy: `access.level` must be `open`. The schema already
/// enforces this for conforming records; checking the raw value keeps
/// the gate independent of the validator.
fn check_access(record: &RawRecord, report: &mut Report) {
    let level = record
        .value
        .get("access")
        .and_then(|access| access.get("level"))
        .and_then(Value::as_str);
    if let Some(level) = level {
        if level != "open" {
            report.error(Violation::at_field(
                record.line,
                "access.level",
                format!("access level is not open: {level}"),
            ));
        }
    }
}

fn check_list_duplicates(record: &RawRecord, report: &mut Report) {
    for field in LIST_FIELDS {
        let Some(values) = record.value.get(field).and_then(Value::as_array) else {
            continue;
        };
        let mut seen = std::collections::HashSet::new();
        let mut dupes: Vec<&str> = Vec::new();
        for value in values.iter().filter_map(Value::as_str) {
            if !seen.insert(value) && !dupes.contains(&value) {
                dupes.push(value);
            }
        }
        if !dupes.is_empty() {
            report.warning(Violation::at_line(
                record.line,
                format!("duplicate values in {field}: {}", dupes.join(", ")),
            ));
        }
    }
}

fn check_license(record: &RawRecord, report: &mut Report) {
    let missing = record
        .value
        .get("license")
        .and_then(Value::as_str)
        .is_none_or(str::is_empty);
    if missing {
        report.warning(Violation::at_line(record.line, "missing license"));
    }
}

/// Extract an optional ISO date field, reporting parse failures.
fn date_field(
    record: &RawRecord,
    object: &Value,
    field: &str,
    report: &mut Report,
) -> Option<NaiveDate> {
    let raw = object.get(field).and_then(Value::as_str)?;
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<NaiveDate>() {
        Ok(date) => Some(date),
        Err(_) => {
            report.error(Violation::at_field(
                record.line,
                field,
                format!("invalid date: {raw}"),
            ));
            None
        }
    }
}
