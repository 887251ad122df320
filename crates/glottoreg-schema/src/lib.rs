//! # glottoreg-schema
//!
//! JSON Schema generation, validation, and the dataset validator.
//!
//! This crate provides:
//! - `SchemaRegistry`: the single authoritative store of JSON Schemas,
//!   built from `glottoreg-core` types
//! - `Validator`: per-record validation of the whole canonical dataset,
//!   reporting 1-indexed line numbers and field paths
//!
//! ## Architecture
//!
//! Record types carry `#[derive(JsonSchema)]` in `glottoreg-core`; this
//! crate assembles them into the registry, patches in the pattern
//! constraints the derive cannot express, and exposes validation. Every
//! other component treats the registry as ground truth for the field set.

pub mod error;
pub mod registry;
pub mod validator;

pub use error::SchemaError;
pub use registry::SchemaRegistry;
pub use validator::Validator;
