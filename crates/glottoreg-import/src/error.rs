//! Importer error types.

use std::path::PathBuf;

use glottoreg_schema::error::SchemaError;
use glottoreg_store::error::StoreError;

/// Fatal importer failures. Per-row problems are not errors; they land
/// in the import report and follow the row-error policy.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to read tabular input {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("input {path} has no header row")]
    MissingHeader { path: PathBuf },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
