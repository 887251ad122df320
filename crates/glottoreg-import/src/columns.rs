//! Header-to-field mapping for tabular input.
//!
//! Catalog exports never agree on header names, so every header is
//! normalized (lowercased, non-alphanumeric runs collapsed to `_`) and
//! then resolved through an alias table. Unmapped headers are kept by
//! name so the importer can warn about (or reject) them.

use std::fmt;

/// A recognized input column, keyed to the record field it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    ResourceId,
    Glottocode,
    GlottocodesSecondary,
    Title,
    Description,
    ResourceType,
    Modality,
    Domain,
    Formats,
    AnnotationLayers,
    License,
    AccessLevel,
    AccessConstraints,
    AccessContact,
    LandingUrl,
    LinkDownload,
    LinkApi,
    LinkCode,
    LinkDoi,
    LinkPaper,
    LinkOther,
    Links,
    CitationPreferred,
    CitationBibtex,
    ProvenanceSourceCatalog,
    ProvenanceSourceRecord,
    ProvenanceLastVerified,
    Created,
    Updated,
    CurationStatus,
    CurationMaintainers,
    CurationNotes,
    Tags,
}

impl Column {
    /// Canonical header name for this column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResourceId => "resource_id",
            Self::Glottocode => "glottocode",
            Self::GlottocodesSecondary => "glottocodes_secondary",
            Self::Title => "title",
            Self::Description => "description",
            Self::ResourceType => "resource_type",
            Self::Modality => "modality",
            Self::Domain => "domain",
            Self::Formats => "formats",
            Self::AnnotationLayers => "annotation_layers",
            Self::License => "license",
            Self::AccessLevel => "access_level",
            Self::AccessConstraints => "access_constraints",
            Self::AccessContact => "access_contact",
            Self::LandingUrl => "landing_url",
            Self::LinkDownload => "link_download",
            Self::LinkApi => "link_api",
            Self::LinkCode => "link_code",
            Self::LinkDoi => "link_doi",
            Self::LinkPaper => "link_paper",
            Self::LinkOther => "link_other",
            Self::Links => "links",
            Self::CitationPreferred => "citation_preferred",
            Self::CitationBibtex => "citation_bibtex",
            Self::ProvenanceSourceCatalog => "provenance_source_catalog",
            Self::ProvenanceSourceRecord => "provenance_source_record",
            Self::ProvenanceLastVerified => "provenance_last_verified",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::CurationStatus => "curation_status",
            Self::CurationMaintainers => "curation_maintainers",
            Self::CurationNotes => "curation_notes",
            Self::Tags => "tags",
        }
    }

    /// Resolve a raw header, accepting the canonical name and the
    /// aliases seen in source catalogs.
    #[must_use]
    pub fn from_header(raw: &str) -> Option<Self> {
        let normalized = normalize_header(raw);
        let column = match normalized.as_str() {
            "resource_id" | "resourceid" | "resource" | "id" => Self::ResourceId,
            "glottocode" | "glottocodes" => Self::Glottocode,
            "glottocodes_secondary" | "secondary_glottocodes" | "secondary_glottocode"
            | "glottocode_secondary" => Self::GlottocodesSecondary,
            "title" | "name" => Self::Title,
            "description" | "summary" => Self::Description,
            "resource_type" | "type" => Self::ResourceType,
            "modality" | "modalities" => Self::Modality,
            "domain" | "domains" => Self::Domain,
            "formats" | "format" => Self::Formats,
            "annotation_layers" | "annotation_layer" | "annotations" => Self::AnnotationLayers,
            "license" | "licence" => Self::License,
            "access_level" | "access" => Self::AccessLevel,
            "access_constraints" | "constraints" => Self::AccessConstraints,
            "access_contact" | "contact" => Self::AccessContact,
            "landing_url" | "landing" | "landing_page" | "landingpage" | "url" | "homepage" => {
                Self::LandingUrl
            }
            "link_download" | "download_url" | "download" => Self::LinkDownload,
            "link_api" | "api_url" => Self::LinkApi,
            "link_code" | "code_url" | "repository" => Self::LinkCode,
            "link_doi" | "doi" | "doi_url" => Self::LinkDoi,
            "link_paper" | "paper_url" | "paper" => Self::LinkPaper,
            "link_other" | "other_url" => Self::LinkOther,
            "links" => Self::Links,
            "citation_preferred" | "citation" => Self::CitationPreferred,
            "citation_bibtex" | "bibtex" => Self::CitationBibtex,
            "provenance_source_catalog" | "source_catalog" | "catalog" => {
                Self::ProvenanceSourceCatalog
            }
            "provenance_source_record" | "source_record" => Self::ProvenanceSourceRecord,
            "provenance_last_verified" | "last_verified" => Self::ProvenanceLastVerified,
            "created" | "date_created" => Self::Created,
            "updated" | "date_updated" => Self::Updated,
            "curation_status" | "status" => Self::CurationStatus,
            "curation_maintainers" | "maintainers" | "maintainer" => Self::CurationMaintainers,
            "curation_notes" | "notes" => Self::CurationNotes,
            "tags" | "keywords" => Self::Tags,
            _ => return None,
        };
        Some(column)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a raw header: lowercase, non-alphanumeric runs to a single
/// `_`, leading/trailing `_` trimmed.
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Positional resolution of a header row.
///
/// The first header mapping to a given column wins; repeats are dropped
/// and recorded so the importer can warn.
#[derive(Debug, Default)]
pub struct HeaderMap {
    slots: Vec<Option<Column>>,
    pub unknown: Vec<String>,
    pub duplicates: Vec<String>,
}

impl HeaderMap {
    #[must_use]
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = Self::default();
        let mut seen = std::collections::HashSet::new();
        for raw in headers {
            match Column::from_header(raw) {
                Some(column) if seen.insert(column) => map.slots.push(Some(column)),
                Some(_) => {
                    map.duplicates.push(raw.to_string());
                    map.slots.push(None);
                }
                None => {
                    map.unknown.push(raw.to_string());
                    map.slots.push(None);
                }
            }
        }
        map
    }

    /// Column for a 0-indexed cell position, if that header mapped.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Column> {
        self.slots.get(index).copied().flatten()
    }

    /// Number of mapped columns.
    #[must_use]
    pub fn mapped_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Resource ID", "resource_id")]
    #[case("  landing-page ", "landing_page")]
    #[case("DOI (URL)", "doi_url")]
    #[case("annotation__layers", "annotation_layers")]
    #[case("__tags__", "tags")]
    fn header_normalization(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_header(raw), expected);
    }

    #[rstest]
    #[case("resource_id", Column::ResourceId)]
    #[case("Resource", Column::ResourceId)]
    #[case("glottocodes", Column::Glottocode)]
    #[case("secondary_glottocodes", Column::GlottocodesSecondary)]
    #[case("Landing Page", Column::LandingUrl)]
    #[case("DOI", Column::LinkDoi)]
    #[case("download-url", Column::LinkDownload)]
    #[case("status", Column::CurationStatus)]
    #[case("maintainers", Column::CurationMaintainers)]
    #[case("last_verified", Column::ProvenanceLastVerified)]
    #[case("Format", Column::Formats)]
    #[case("access", Column::AccessLevel)]
    fn alias_resolution(#[case] raw: &str, #[case] expected: Column) {
        assert_eq!(Column::from_header(raw), Some(expected));
    }

    #[test]
    fn unrecognized_header_is_none() {
        assert_eq!(Column::from_header("popularity"), None);
        assert_eq!(Column::from_header(""), None);
    }

    #[test]
    fn header_map_tracks_unknown_and_duplicates() {
        let map = HeaderMap::from_headers(["resource_id", "title", "name", "popularity"]);
        assert_eq!(map.get(0), Some(Column::ResourceId));
        assert_eq!(map.get(1), Some(Column::Title));
        assert_eq!(map.get(2), None);
        assert_eq!(map.duplicates, vec!["name".to_string()]);
        assert_eq!(map.unknown, vec!["popularity".to_string()]);
        assert_eq!(map.mapped_count(), 2);
    }

    #[test]
    fn first_header_wins_for_a_column() {
        let map = HeaderMap::from_headers(["landing_url", "homepage"]);
        assert_eq!(map.get(0), Some(Column::LandingUrl));
        assert_eq!(map.get(1), None);
        assert_eq!(map.duplicates.len(), 1);
    }
}
