//! Workflow module
//!
//! The user-facing operations: bulk folder renaming, file sorting, folder
//! cleanup, and the background runner that keeps them off the interactive
//! thread. Each workflow is split into a pure `plan` step (no filesystem
//! mutation; this is the preview) and an `apply` step that executes the
//! plan with per-item outcomes.
//!
//! # Submodules
//!
//! - `events` - Structured progress events
//! - `runner` - Background thread + event channel
//! - `renamer` - Bulk folder renamer (and file-to-folder-name renaming)
//! - `sorter` - Sort files into category folders by extension
//! - `cleanup` - Flatten folders, remove empty/temp/junk files

pub mod cleanup;
pub mod events;
pub mod renamer;
pub mod runner;
pub mod sorter;

use crate::core::error::{CleanupError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Which folders a rename/cleanup pass works on.
///
/// The original tool kept the current selection in mutable UI state; here it
/// is an explicit parameter of every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Scope {
    /// All immediate subfolders of the root; if the root has none, the root
    /// itself is processed
    #[default]
    Auto,
    /// Only the named immediate subfolders
    Selected(Vec<String>),
}

/// A single failed operation within an otherwise-continuing batch.
#[derive(Debug, Clone)]
pub struct Failure {
    pub path: PathBuf,
    pub message: String,
}

pub use events::{EventSink, TaskEvent};
pub use runner::{spawn_task, TaskHandle};

/// Reject roots the workflows must not touch before any filesystem access.
pub(crate) fn validate_root(root: &Path) -> Result<()> {
    if root.as_os_str().is_empty() {
        return Err(CleanupError::InvalidInput(
            "Root folder must not be empty".to_string(),
        ));
    }
    if !root.is_dir() {
        return Err(CleanupError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Resolve the folders a scope refers to.
///
/// `Auto` means all immediate subfolders, or the root itself when it has
/// none (a leaf folder is processed in place). Selected names that no
/// longer exist are silently dropped, matching a selection going stale.
pub(crate) fn folders_in_scope(root: &Path, scope: &Scope) -> Result<Vec<PathBuf>> {
    match scope {
        Scope::Auto => {
            let mut dirs: Vec<PathBuf> = fs::read_dir(root)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect();
            dirs.sort();
            if dirs.is_empty() {
                Ok(vec![root.to_path_buf()])
            } else {
                Ok(dirs)
            }
        }
        Scope::Selected(names) => Ok(names
            .iter()
            .map(|name| root.join(name))
            .filter(|p| p.is_dir())
            .collect()),
    }
}
