//! Export modules
//!
//! Handles snapshot export:
//! - Snapshots: JSON-lines stream of per-tick frame snapshots

pub mod snapshot_export;

pub use snapshot_export::{ExportError, SnapshotWriter, export_snapshots};
