//! # glottoreg-store
//!
//! Access to the two persisted artifacts of the registry:
//!
//! - the **canonical dataset**: a hand-maintained, line-delimited JSON
//!   store, one record per line, the single source of truth
//! - the **web snapshot**: a derived JSON-array projection consumed
//!   read-only by the search UI, regenerable at any time
//!
//! Reads keep 1-indexed physical line numbers so checking stages can
//! point contributors at the exact line to fix. All writes go through a
//! temp file in the destination directory plus an atomic rename: a
//! failed run never leaves a partially written store behind.

pub mod dataset;
pub mod error;
pub mod snapshot;

pub use error::StoreError;
