//! Row-to-record conversion.
//!
//! One source row becomes one candidate `Record`. Every problem in a row
//! is collected before the row is rejected, so a contributor sees the
//! full fix list for the batch in one run. Violations carry the physical
//! source row number (header = row 1).

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use glottoreg_core::enums::{AccessLevel, CurationStatus, LinkKind, Modality, ResourceType};
use glottoreg_core::record::{
    Access, Citation, Curation, Link, Provenance, Record, is_wellformed_glottocode,
    normalize_resource_id,
};
use glottoreg_core::report::{Report, Violation};

use crate::columns::Column;

/// Trimmed, non-empty cell values of one row, keyed by mapped column.
pub type RowValues = HashMap<Column, String>;

/// Values filled in when the source omits them.
#[derive(Debug, Clone)]
pub struct Defaults {
    /// `created` date for new records; `None` leaves the field unset.
    pub created: Option<NaiveDate>,
    pub curation_status: CurationStatus,
    pub maintainers: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            created: None,
            curation_status: CurationStatus::Seed,
            maintainers: Vec::new(),
        }
    }
}

const REQUIRED: &[Column] = &[
    Column::ResourceId,
    Column::Glottocode,
    Column::Title,
    Column::ResourceType,
    Column::License,
    Column::LandingUrl,
];

const LINK_COLUMNS: &[(Column, LinkKind)] = &[
    (Column::LinkDownload, LinkKind::Download),
    (Column::LinkApi, LinkKind::Api),
    (Column::LinkCode, LinkKind::Code),
    (Column::LinkDoi, LinkKind::Doi),
    (Column::LinkPaper, LinkKind::Paper),
    (Column::LinkOther, LinkKind::Other),
];

/// Build a candidate record from one row.
///
/// Warnings (skipped link chunks and the like) go straight into
/// `report`; anything that disqualifies the row comes back as the `Err`
/// list of violations for the caller's row-error policy to route.
///
/// # Errors
///
/// Returns every violation found in the row: missing required values,
/// malformed codes and dates, and out-of-vocabulary enum values.
pub fn build_record(
    row: usize,
    values: &RowValues,
    defaults: &Defaults,
    report: &mut Report,
) -> Result<Record, Vec<Violation>> {
    let mut errors = Vec::new();
    let get = |column: Column| values.get(&column).map(String::as_str);

    for &column in REQUIRED {
        if get(column).is_none() {
            errors.push(Violation::at_field(
                row,
                column.as_str(),
                "missing required value",
            ));
        }
    }

    let resource_id = get(Column::ResourceId).and_then(|raw| {
        let id = normalize_resource_id(raw);
        if id.is_empty() {
            errors.push(Violation::at_field(
                row,
                "resource_id",
                format!("'{raw}' is empty after normalization"),
            ));
            None
        } else {
            Some(id)
        }
    });

    let glottocode = get(Column::Glottocode).and_then(|raw| {
        if is_wellformed_glottocode(raw) {
            Some(raw.to_string())
        } else {
            errors.push(Violation::at_field(
                row,
                "glottocode",
                format!("'{raw}' is not a glottocode (4 lowercase letters + 4 digits)"),
            ));
            None
        }
    });

    let mut glottocodes_secondary = Vec::new();
    if let Some(raw) = get(Column::GlottocodesSecondary) {
        for code in split_list(raw) {
            if is_wellformed_glottocode(&code) {
                glottocodes_secondary.push(code);
            } else {
                errors.push(Violation::at_field(
                    row,
                    "glottocodes_secondary",
                    format!("'{code}' is not a glottocode"),
                ));
            }
        }
    }

    let title = get(Column::Title).map(str::to_string);
    let resource_type = get(Column::ResourceType).and_then(|raw| {
        parse_enum::<ResourceType>(raw).or_else(|| {
            errors.push(Violation::at_field(
                row,
                "resource_type",
                format!("unknown resource type '{raw}'"),
            ));
            None
        })
    });

    let mut modality = Vec::new();
    if let Some(raw) = get(Column::Modality) {
        for value in split_list(raw) {
            match parse_enum::<Modality>(&value) {
                Some(parsed) => modality.push(parsed),
                None => errors.push(Violation::at_field(
                    row,
                    "modality",
                    format!("unknown modality '{value}'"),
                )),
            }
        }
    }

    let level = match get(Column::AccessLevel) {
        None => AccessLevel::Open,
        Some(raw) => parse_enum::<AccessLevel>(raw).unwrap_or_else(|| {
            errors.push(Violation::at_field(
                row,
                "access_level",
                format!("'{raw}' is not an accepted access level (registry is open-only)"),
            ));
            AccessLevel::Open
        }),
    };
    let access = Access {
        level,
        constraints: get(Column::AccessConstraints).map_or_else(Vec::new, split_list),
        contact: get(Column::AccessContact).map(str::to_string),
    };

    let links = build_links(row, &get, report);

    let created = date_value(row, Column::Created, &get, &mut errors).or(defaults.created);
    let updated = date_value(row, Column::Updated, &get, &mut errors);
    let last_verified = date_value(row, Column::ProvenanceLastVerified, &get, &mut errors);

    let source_catalog = get(Column::ProvenanceSourceCatalog).map(str::to_string);
    let source_record = get(Column::ProvenanceSourceRecord).map(str::to_string);
    let provenance = if source_catalog.is_some() || source_record.is_some() || last_verified.is_some()
    {
        Some(Provenance {
            source_catalog,
            source_record,
            last_verified,
        })
    } else {
        None
    };

    let preferred = get(Column::CitationPreferred).map(str::to_string);
    let bibtex = get(Column::CitationBibtex).map(str::to_string);
    let citation = if preferred.is_some() || bibtex.is_some() {
        Some(Citation { preferred, bibtex })
    } else {
        None
    };

    let status = match get(Column::CurationStatus) {
        None => defaults.curation_status,
        Some(raw) => parse_enum::<CurationStatus>(raw).unwrap_or_else(|| {
            errors.push(Violation::at_field(
                row,
                "curation_status",
                format!("unknown curation status '{raw}'"),
            ));
            defaults.curation_status
        }),
    };
    let curation = Curation {
        status,
        maintainers: get(Column::CurationMaintainers)
            .map_or_else(|| defaults.maintainers.clone(), split_list),
        notes: get(Column::CurationNotes).map(str::to_string),
    };

    match (resource_id, glottocode, title, resource_type) {
        (Some(resource_id), Some(glottocode), Some(title), Some(resource_type))
            if errors.is_empty() =>
        {
            Ok(Record {
                resource_id,
                glottocode,
                glottocodes_secondary,
                title,
                description: get(Column::Description).map(str::to_string),
                resource_type,
                modality,
                domain: get(Column::Domain).map_or_else(Vec::new, split_list),
                formats: get(Column::Formats).map_or_else(Vec::new, split_list),
                annotation_layers: get(Column::AnnotationLayers).map_or_else(Vec::new, split_list),
                license: get(Column::License).map(str::to_string),
                access,
                links,
                citation,
                provenance,
                created,
                updated,
                curation: Some(curation),
                tags: get(Column::Tags).map_or_else(Vec::new, split_list),
            })
        }
        _ => Err(errors),
    }
}

/// Assemble the link set: `landing_url`, the dedicated `link_*` columns,
/// then free-form `links` chunks of `kind:url`. Deduplicated by
/// `(kind, url)`, order preserved.
fn build_links<'a>(
    row: usize,
    get: &impl Fn(Column) -> Option<&'a str>,
    report: &mut Report,
) -> Vec<Link> {
    let mut links = Vec::new();
    if let Some(url) = get(Column::LandingUrl) {
        links.push(Link {
            kind: LinkKind::Landing,
            url: url.to_string(),
        });
    }
    for &(column, kind) in LINK_COLUMNS {
        if let Some(url) = get(column) {
            links.push(Link {
                kind,
                url: url.to_string(),
            });
        }
    }
    if let Some(raw) = get(Column::Links) {
        for chunk in raw.split([';', '|']).map(str::trim).filter(|c| !c.is_empty()) {
            let Some((kind_raw, url)) = chunk.split_once(':') else {
                report.warning(Violation::at_field(
                    row,
                    "links",
                    format!("malformed link chunk '{chunk}' skipped (expected kind:url)"),
                ));
                continue;
            };
            match parse_enum::<LinkKind>(kind_raw) {
                Some(kind) => links.push(Link {
                    kind,
                    url: url.trim().to_string(),
                }),
                None => report.warning(Violation::at_field(
                    row,
                    "links",
                    format!("unknown link kind '{}' skipped", kind_raw.trim()),
                )),
            }
        }
    }

    let mut seen = HashSet::new();
    links.retain(|link| seen.insert((link.kind, link.url.clone())));
    links
}

/// Split a list cell on `;`, `,`, or `|`.
fn split_list(raw: &str) -> Vec<String> {
    raw.split([';', ',', '|'])
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a `snake_case` vocabulary value via serde, accepting hyphen and
/// space variants.
fn parse_enum<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    serde_json::from_str(&format!("\"{normalized}\"")).ok()
}

fn date_value<'a>(
    row: usize,
    column: Column,
    get: &impl Fn(Column) -> Option<&'a str>,
    errors: &mut Vec<Violation>,
) -> Option<NaiveDate> {
    let raw = get(column)?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(Violation::at_field(
                row,
                column.as_str(),
                format!("invalid date '{raw}' (expected YYYY-MM-DD)"),
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn values(pairs: &[(Column, &str)]) -> RowValues {
        pairs
            .iter()
            .map(|&(column, value)| (column, value.to_string()))
            .collect()
    }

    fn minimal() -> RowValues {
        values(&[
            (Column::ResourceId, "Demo Corpus"),
            (Column::Glottocode, "stan1293"),
            (Column::Title, "Demo"),
            (Column::ResourceType, "corpus"),
            (Column::License, "CC-BY-4.0"),
            (Column::LandingUrl, "https://example.org/demo"),
        ])
    }

    #[test]
    fn minimal_row_builds_with_defaults() {
        let defaults = Defaults {
            created: NaiveDate::from_ymd_opt(2026, 8, 29),
            curation_status: CurationStatus::Seed,
            maintainers: vec!["@you".to_string()],
        };
        let mut report = Report::new();
        let record = build_record(2, &minimal(), &defaults, &mut report).unwrap();

        assert_eq!(record.resource_id, "demo-corpus");
        assert_eq!(record.glottocode, "stan1293");
        assert_eq!(record.license.as_deref(), Some("CC-BY-4.0"));
        assert_eq!(record.created, NaiveDate::from_ymd_opt(2026, 8, 29));
        assert!(record.has_landing_link());
        let curation = record.curation.unwrap();
        assert_eq!(curation.status, CurationStatus::Seed);
        assert_eq!(curation.maintainers, vec!["@you".to_string()]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn all_missing_required_values_are_listed() {
        let mut report = Report::new();
        let errors = build_record(3, &RowValues::new(), &Defaults::default(), &mut report)
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().filter_map(|v| v.field.as_deref()).collect();
        for required in ["resource_id", "glottocode", "title", "resource_type", "license",
            "landing_url"]
        {
            assert!(fields.contains(&required), "missing {required}");
        }
        assert!(errors.iter().all(|v| v.line == Some(3)));
    }

    #[test]
    fn malformed_glottocodes_are_rejected() {
        let mut row = minimal();
        row.insert(Column::Glottocode, "STAN1293".to_string());
        row.insert(Column::GlottocodesSecondary, "russ1263; nope".to_string());
        let mut report = Report::new();
        let errors = build_record(2, &row, &Defaults::default(), &mut report).unwrap_err();
        assert!(errors.iter().any(|v| v.field.as_deref() == Some("glottocode")));
        assert!(
            errors
                .iter()
                .any(|v| v.field.as_deref() == Some("glottocodes_secondary")
                    && v.message.contains("nope"))
        );
    }

    #[test]
    fn unknown_resource_type_is_an_error() {
        let mut row = minimal();
        row.insert(Column::ResourceType, "treebank".to_string());
        let mut report = Report::new();
        let errors = build_record(2, &row, &Defaults::default(), &mut report).unwrap_err();
        assert!(errors.iter().any(|v| v.message.contains("treebank")));
    }

    #[test]
    fn non_open_access_level_is_an_error() {
        let mut row = minimal();
        row.insert(Column::AccessLevel, "restricted".to_string());
        let mut report = Report::new();
        let errors = build_record(2, &row, &Defaults::default(), &mut report).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|v| v.field.as_deref() == Some("access_level"))
        );
    }

    #[test]
    fn list_cells_split_on_all_separators() {
        let mut row = minimal();
        row.insert(Column::Formats, "txt; xml, conllu | eaf".to_string());
        row.insert(Column::Modality, "text;audio".to_string());
        let mut report = Report::new();
        let record = build_record(2, &row, &Defaults::default(), &mut report).unwrap();
        assert_eq!(record.formats, vec!["txt", "xml", "conllu", "eaf"]);
        assert_eq!(record.modality, vec![Modality::Text, Modality::Audio]);
    }

    #[test]
    fn links_are_collected_and_deduplicated() {
        let mut row = minimal();
        row.insert(Column::LinkDoi, "https://doi.org/10.5281/zenodo.1".to_string());
        row.insert(
            Column::Links,
            "doi: https://doi.org/10.5281/zenodo.1 | code: https://github.com/x/y | homepage: https://example.org"
                .to_string(),
        );
        let mut report = Report::new();
        let record = build_record(2, &row, &Defaults::default(), &mut report).unwrap();

        let kinds: Vec<LinkKind> = record.links.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LinkKind::Landing, LinkKind::Doi, LinkKind::Code]);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("homepage"));
    }

    #[test]
    fn bad_date_is_an_error() {
        let mut row = minimal();
        row.insert(Column::Created, "29/08/2026".to_string());
        let mut report = Report::new();
        let errors = build_record(2, &row, &Defaults::default(), &mut report).unwrap_err();
        assert!(errors.iter().any(|v| v.field.as_deref() == Some("created")));
    }

    #[test]
    fn provenance_and_citation_are_omitted_when_empty() {
        let mut report = Report::new();
        let record = build_record(2, &minimal(), &Defaults::default(), &mut report).unwrap();
        assert!(record.provenance.is_none());
        assert!(record.citation.is_none());
    }
}
