//! Duplicate detection module
//!
//! Finds content-identical files with a staged size → partial-hash →
//! full-hash filter, then deletes or relocates the redundant copies.
//!
//! # Submodules
//!
//! - `fingerprint` - Partial (64 KiB prefix) and full content digests
//! - `engine` - The staged scan pipeline
//! - `actions` - Delete/move actions over confirmed duplicate groups

pub mod actions;
pub mod engine;
pub mod fingerprint;

pub use actions::{ActionOutcome, DuplicateAction, FileOutcome};
pub use engine::{
    DuplicateGroup, FileRecord, ScanOutcome, ScanProgress, ScanRequest, ScanStage, SkippedFile,
    TypeFilter,
};
pub use fingerprint::HashAlgorithm;
