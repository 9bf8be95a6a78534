//! Import Folder Cleanup Library
//!
//! A library + CLI tool that organizes large, messy directory trees of
//! imported media: bulk-renames folders and files under user rules, sorts
//! files into category folders, flattens nested structures, and finds
//! duplicate content.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`core`] - Configuration, error handling, and filesystem helpers
//! - [`naming`] - Case-insensitive namespace model, the naming conflict
//!   resolver, and the user-configurable cleaning rules
//! - [`duplicate`] - Staged duplicate detection (size → partial hash →
//!   full hash) and delete/move actions over duplicate groups
//! - [`workflow`] - The rename/sort/cleanup workflows, each split into a
//!   pure planning step and an applying step, plus the background runner
//! - [`cli`] - Command-line interface (only used by the binary)
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use import_folder_cleanup::duplicate::{engine, HashAlgorithm, ScanRequest, TypeFilter};
//! use std::path::PathBuf;
//! use std::sync::atomic::AtomicBool;
//!
//! fn main() -> anyhow::Result<()> {
//!     let request = ScanRequest {
//!         root: PathBuf::from("D:/Imports"),
//!         recursive: true,
//!         min_size_bytes: 100 * 1024,
//!         type_filter: TypeFilter::MediaOnly,
//!         algorithm: HashAlgorithm::Sha256,
//!     };
//!
//!     let cancel = AtomicBool::new(false);
//!     let outcome = engine::scan(&request, &cancel, |progress| {
//!         println!("{:?}: {}", progress.stage, progress.processed);
//!     })?;
//!
//!     for group in &outcome.groups {
//!         println!("{} copies of {}", group.files.len(), group.canonical().path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Renaming with conflict resolution
//!
//! ```rust
//! use import_folder_cleanup::naming::{
//!     resolve_batch, EntryKind, Namespace, RenameRequest,
//! };
//! use std::path::PathBuf;
//!
//! let mut namespace = Namespace::from_names(["Holiday", "Concert"]);
//! let requests = vec![RenameRequest {
//!     source: PathBuf::from("/imports/HOLIDAY_2021"),
//!     current_name: "HOLIDAY_2021".to_string(),
//!     proposed_name: "Holiday".to_string(),
//!     kind: EntryKind::Folder,
//! }];
//!
//! let resolved = resolve_batch(&mut namespace, &requests).unwrap();
//! assert_eq!(resolved[0].final_name, "Holiday (1)");
//! ```

pub mod cli;
pub mod core;
pub mod duplicate;
pub mod naming;
pub mod workflow;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
