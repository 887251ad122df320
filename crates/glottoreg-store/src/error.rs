//! Store error types. These are the fatal, fail-fast class: a missing or
//! unreadable file aborts the invocation, unlike validation findings
//! which are accumulated.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line of the store is not valid JSON, in a context where the
    /// caller needs every record (e.g. building the snapshot).
    #[error("[line {line}] JSON decode error in {path}: {source}")]
    Decode {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
