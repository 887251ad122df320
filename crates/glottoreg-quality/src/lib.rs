//! # glottoreg-quality
//!
//! Cross-record and cross-artifact rules that a per-record schema cannot
//! see: `resource_id` uniqueness, landing-link presence, date ordering,
//! access policy, and snapshot synchronization.
//!
//! Rules run over raw JSON values, not typed records, so a dataset that
//! fails schema validation still gets a complete quality report; the
//! validator and the quality checker are independent gates. Every rule
//! is checked and reported independently; nothing short-circuits.

pub mod checker;

pub use checker::QualityChecker;
