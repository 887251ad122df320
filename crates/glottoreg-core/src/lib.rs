//! # glottoreg-core
//!
//! Core types for the glottoreg registry pipeline.
//!
//! This crate provides:
//! - `Record` and its nested objects: the unit of the canonical dataset
//! - Controlled-vocabulary enums (resource type, modality, link kind, ...)
//! - `Violation` / `Report`: the shared reporting types every checking
//!   stage (validator, quality checker, importer) accumulates into
//!
//! ## Architecture
//!
//! Types here carry `#[derive(JsonSchema)]`; the authoritative JSON Schema
//! is assembled from them in `glottoreg-schema`. Other crates must treat
//! that schema as ground truth instead of re-declaring field semantics.

pub mod enums;
pub mod record;
pub mod report;
