//! Actions over duplicate groups
//!
//! Deleting or relocating the non-canonical members of [`DuplicateGroup`]s.
//! The canonical member (lexicographically first path) is never touched.
//! Every file gets its own outcome; one failure never blocks the rest of
//! the batch, and nothing here is transactional: a completed delete stays
//! done even if a later one fails.

use crate::core::error::Result;
use crate::core::fsops;
use crate::duplicate::engine::DuplicateGroup;
use crate::naming::{claim_name, EntryKind, Namespace};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// What to do with the non-canonical members of each group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateAction {
    /// Remove them
    Delete,
    /// Move them into this subfolder of the scan root
    MoveTo(String),
}

/// Per-file result of applying an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    Failed(String),
}

/// One file's outcome within an action batch.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub outcome: ActionOutcome,
}

impl FileOutcome {
    fn applied(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            outcome: ActionOutcome::Applied,
        }
    }

    fn failed(path: &Path, reason: String) -> Self {
        Self {
            path: path.to_path_buf(),
            outcome: ActionOutcome::Failed(reason),
        }
    }
}

/// Apply an action to every non-canonical member of every group.
///
/// `root` is the scanned folder; [`DuplicateAction::MoveTo`] creates its
/// destination underneath it, and name conflicts in the destination are
/// resolved with numbered suffixes. Cancellation stops the queue between
/// files: work already done stands and is reported in the returned
/// outcomes.
pub fn apply_action(
    groups: &[DuplicateGroup],
    action: &DuplicateAction,
    root: &Path,
    cancel: &AtomicBool,
) -> Result<Vec<FileOutcome>> {
    let mut outcomes = Vec::new();

    // Destination namespace is shared across the whole batch so moved files
    // see each other's claimed names.
    let mut destination = match action {
        DuplicateAction::MoveTo(subfolder) => {
            let dest = root.join(subfolder);
            fs::create_dir_all(&dest)?;
            Some((dest.clone(), Namespace::from_dir(&dest)?))
        }
        DuplicateAction::Delete => None,
    };

    'groups: for group in groups {
        for record in group.duplicates() {
            if cancel.load(Ordering::Relaxed) {
                warn!("Duplicate action cancelled; {} files processed", outcomes.len());
                break 'groups;
            }

            let outcome = match &mut destination {
                None => delete_file(&record.path),
                Some((dest_dir, namespace)) => move_into(&record.path, dest_dir, namespace),
            };
            outcomes.push(outcome);
        }
    }

    Ok(outcomes)
}

fn delete_file(path: &Path) -> FileOutcome {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("Deleted duplicate: {}", path.display());
            FileOutcome::applied(path)
        }
        Err(e) => {
            warn!("Failed to delete {}: {}", path.display(), e);
            FileOutcome::failed(path, e.to_string())
        }
    }
}

fn move_into(path: &Path, dest_dir: &Path, namespace: &mut Namespace) -> FileOutcome {
    let desired = match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => return FileOutcome::failed(path, "No file name".to_string()),
    };

    let final_name = match claim_name(namespace, &desired, EntryKind::File) {
        Ok(name) => name,
        Err(e) => return FileOutcome::failed(path, e.to_string()),
    };

    match fsops::move_file(path, &dest_dir.join(&final_name)) {
        Ok(()) => {
            info!("Moved duplicate: {} -> {}", path.display(), final_name);
            FileOutcome::applied(path)
        }
        Err(e) => {
            // Give the unused slot back so later files can still take it
            namespace.release(&final_name);
            warn!("Failed to move {}: {}", path.display(), e);
            FileOutcome::failed(path, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicate::engine::{scan, ScanRequest, TypeFilter};
    use crate::duplicate::fingerprint::HashAlgorithm;
    use std::fs;

    fn scan_all(root: &Path) -> Vec<DuplicateGroup> {
        let request = ScanRequest {
            root: root.to_path_buf(),
            recursive: true,
            min_size_bytes: 0,
            type_filter: TypeFilter::All,
            algorithm: HashAlgorithm::Sha256,
        };
        let cancel = AtomicBool::new(false);
        scan(&request, &cancel, |_| {}).unwrap().groups
    }

    #[test]
    fn test_delete_keeps_canonical() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.bin", "b.bin", "c.bin"] {
            fs::write(dir.path().join(name), b"same").unwrap();
        }

        let groups = scan_all(dir.path());
        let cancel = AtomicBool::new(false);
        let outcomes =
            apply_action(&groups, &DuplicateAction::Delete, dir.path(), &cancel).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.outcome == ActionOutcome::Applied));
        assert!(dir.path().join("a.bin").exists());
        assert!(!dir.path().join("b.bin").exists());
        assert!(!dir.path().join("c.bin").exists());
    }

    #[test]
    fn test_move_resolves_destination_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        // Two same-named duplicates from different folders plus an occupant
        // already sitting in the destination.
        fs::write(dir.path().join("clip.mp4"), b"dup content").unwrap();
        fs::write(dir.path().join("sub/clip.mp4"), b"dup content").unwrap();
        fs::create_dir(dir.path().join("Duplicates")).unwrap();
        fs::write(dir.path().join("Duplicates/clip.mp4"), b"occupant").unwrap();

        let groups = scan_all(dir.path());
        // The destination folder itself must not be scanned into the groups
        // in this setup (different content), so we expect one group of two.
        assert_eq!(groups.len(), 1);

        let cancel = AtomicBool::new(false);
        let outcomes = apply_action(
            &groups,
            &DuplicateAction::MoveTo("Duplicates".to_string()),
            dir.path(),
            &cancel,
        )
        .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes.iter().all(|o| o.outcome == ActionOutcome::Applied));
        // Canonical stayed, duplicate landed under a suffixed name
        assert!(dir.path().join("clip.mp4").exists());
        assert!(dir.path().join("Duplicates/clip.mp4").exists());
        assert!(dir.path().join("Duplicates/clip (1).mp4").exists());
    }

    #[test]
    fn test_externally_removed_member_fails_alone() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.bin", "b.bin", "c.bin"] {
            fs::write(dir.path().join(name), b"same").unwrap();
        }

        let groups = scan_all(dir.path());
        // Simulate an external delete between scan and action
        fs::remove_file(dir.path().join("b.bin")).unwrap();

        let cancel = AtomicBool::new(false);
        let outcomes =
            apply_action(&groups, &DuplicateAction::Delete, dir.path(), &cancel).unwrap();

        assert_eq!(outcomes.len(), 2);
        let failed: Vec<_> = outcomes
            .iter()
            .filter(|o| matches!(o.outcome, ActionOutcome::Failed(_)))
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].path, dir.path().join("b.bin"));
        // The other member was still processed
        assert!(!dir.path().join("c.bin").exists());
    }

    #[test]
    fn test_cancel_stops_queue_but_keeps_done_work() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.bin", "b.bin"] {
            fs::write(dir.path().join(name), b"same").unwrap();
        }

        let groups = scan_all(dir.path());
        let cancel = AtomicBool::new(true);
        let outcomes =
            apply_action(&groups, &DuplicateAction::Delete, dir.path(), &cancel).unwrap();
        assert!(outcomes.is_empty());
        assert!(dir.path().join("b.bin").exists());
    }
}
