//! # glottoreg-import
//!
//! Batch importer: CSV/TSV catalog exports in, canonical-dataset records
//! out.
//!
//! The pipeline is header mapping (`columns`), row-to-record conversion
//! (`row`), then the commit policy (`importer`): append or merge,
//! skip-or-abort on bad rows, optional schema validation before commit,
//! atomic destination writes.

pub mod columns;
pub mod error;
pub mod importer;
pub mod row;

pub use error::ImportError;
pub use importer::{Delimiter, ImportMode, ImportOptions, ImportOutcome, RowErrorPolicy, import};
pub use row::Defaults;
