//! Registry record: the unit of the canonical dataset.
//!
//! One `Record` per line of the JSONL store. The schema is closed:
//! `#[serde(deny_unknown_fields)]` on every object, which schemars turns
//! into `additionalProperties: false`, so silent data drift is rejected
//! rather than passed through.
//!
//! `resource_id` is immutable once assigned. A rename is modeled as
//! delete + insert so external references never break silently.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AccessLevel, CurationStatus, LinkKind, Modality, ResourceType};

/// Glottocode format: exactly 4 lowercase letters followed by 4 digits.
/// Format-checked only; verifying against the Glottolog catalog itself is
/// a known future gap.
pub const GLOTTOCODE_PATTERN: &str = "^[a-z]{4}[0-9]{4}$";

/// `resource_id` format: lowercase-with-hyphens.
pub const RESOURCE_ID_PATTERN: &str = "^[a-z0-9]+(-[a-z0-9]+)*$";

/// A single entry in the registry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Record {
    /// Unique, immutable identity. Lowercase-with-hyphens.
    pub resource_id: String,

    /// Primary language classification, format-checked only.
    pub glottocode: String,

    /// Additional language classifications, for multilingual resources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub glottocodes_secondary: Vec<String>,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub resource_type: ResourceType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modality: Vec<Modality>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotation_layers: Vec<String>,

    /// SPDX-style license string. Absence is a quality warning, not a
    /// schema failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    pub access: Access,

    /// At least one link must have kind `landing` (quality rule).
    pub links: Vec<Link>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<Citation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDate>,

    /// Must not precede `created` (quality rule).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curation: Option<Curation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Record {
    /// Whether any link has kind `landing`.
    #[must_use]
    pub fn has_landing_link(&self) -> bool {
        self.links.iter().any(|link| link.kind == LinkKind::Landing)
    }
}

/// Access policy block.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Access {
    pub level: AccessLevel,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl Access {
    /// The default public-only access block.
    #[must_use]
    pub const fn open() -> Self {
        Self {
            level: AccessLevel::Open,
            constraints: Vec::new(),
            contact: None,
        }
    }
}

/// A typed link to an external page for the resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(deny_unknown_fields)]
pub struct Link {
    pub kind: LinkKind,
    pub url: String,
}

/// How to cite the resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Citation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bibtex: Option<String>,
}

/// Where the record came from and when it was last checked.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Provenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_catalog: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_record: Option<String>,

    /// Must not precede `created` and must not be in the future
    /// (quality rules).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verified: Option<NaiveDate>,
}

/// Curation state of the record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Curation {
    pub status: CurationStatus,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Normalize a raw identifier to the `resource_id` form: lowercased, with
/// whitespace and underscore runs collapsed to single hyphens.
#[must_use]
pub fn normalize_resource_id(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_hyphen = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_hyphen = !out.is_empty();
        } else {
            if pending_hyphen {
                out.push('-');
                pending_hyphen = false;
            }
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Format check for a glottocode: 4 lowercase ASCII letters + 4 digits.
#[must_use]
pub fn is_wellformed_glottocode(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 8
        && bytes[..4].iter().all(u8::is_ascii_lowercase)
        && bytes[4..].iter().all(u8::is_ascii_digit)
}
