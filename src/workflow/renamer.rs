//! Bulk folder renamer
//!
//! Applies the user's cleaning rules to every folder in scope and,
//! optionally, renames each folder's files after the folder itself
//! (`Concert.mp4`, `Concert 2.mp4`, …). Planning is pure: it reads the tree,
//! runs every proposed name through the conflict resolver, and returns what
//! *would* happen. Applying executes a plan item by item, reporting
//! failures without stopping.
//!
//! Folders that compete for the same cleaned name are resolved
//! longest-original-name-first, so the most decorated name wins the clean
//! target and shorter ones take numbered suffixes.

use crate::core::error::{CleanupError, Result};
use crate::core::fsops;
use crate::naming::{
    resolve_batch, EntryKind, Namespace, RenameRequest, RenameRules, ResolvedRename,
};
use crate::workflow::{folders_in_scope, validate_root, Failure, Scope};
use log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// One planned file rename inside a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRename {
    pub old_name: String,
    pub new_name: String,
}

/// Planned changes for one folder in scope.
#[derive(Debug, Clone)]
pub struct FolderPlan {
    /// The folder's current path
    pub path: PathBuf,
    pub old_name: String,
    /// Collision-free final name (equal to `old_name` when unchanged)
    pub new_name: String,
    /// Whether the folder itself gets renamed
    pub folder_changed: bool,
    /// File renames inside the folder, based on the final folder name
    pub file_renames: Vec<FileRename>,
}

impl FolderPlan {
    pub fn has_changes(&self) -> bool {
        self.folder_changed || !self.file_renames.is_empty()
    }
}

/// The full preview for one rename pass.
#[derive(Debug, Clone)]
pub struct RenamePlan {
    pub root: PathBuf,
    pub folders: Vec<FolderPlan>,
}

impl RenamePlan {
    pub fn is_empty(&self) -> bool {
        self.folders.iter().all(|f| !f.has_changes())
    }

    pub fn folder_change_count(&self) -> usize {
        self.folders.iter().filter(|f| f.folder_changed).count()
    }

    pub fn file_change_count(&self) -> usize {
        self.folders.iter().map(|f| f.file_renames.len()).sum()
    }
}

/// Result of applying a [`RenamePlan`].
#[derive(Debug, Default)]
pub struct RenameReport {
    pub folders_renamed: usize,
    pub files_renamed: usize,
    pub failures: Vec<Failure>,
}

/// Build the rename plan for a root folder.
pub fn plan(
    root: &Path,
    scope: &Scope,
    rules: &RenameRules,
    rename_files: bool,
) -> Result<RenamePlan> {
    validate_root(root)?;
    let folders = folders_in_scope(root, scope)?;

    // Propose a cleaned name for every folder except the root itself; a
    // rule set that eats the whole name keeps the original.
    let mut proposals: Vec<(PathBuf, String, String)> = Vec::new();
    for folder in &folders {
        let old_name = folder
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let proposed = if folder == root {
            old_name.clone()
        } else {
            let cleaned = rules.apply(&old_name);
            if cleaned.is_empty() {
                old_name.clone()
            } else {
                cleaned
            }
        };
        proposals.push((folder.clone(), old_name, proposed));
    }

    // Longest original name first, so it wins contested clean targets.
    let mut requests: Vec<RenameRequest> = proposals
        .iter()
        .filter(|(_, old, proposed)| proposed != old)
        .map(|(path, old, proposed)| RenameRequest {
            source: path.clone(),
            current_name: old.clone(),
            proposed_name: proposed.clone(),
            kind: EntryKind::Folder,
        })
        .collect();
    requests.sort_by(|a, b| b.current_name.chars().count().cmp(&a.current_name.chars().count()));

    let mut namespace = Namespace::from_dir(root)?;
    let resolved = resolve_batch(&mut namespace, &requests)?;
    let final_names: HashMap<PathBuf, ResolvedRename> = resolved
        .into_iter()
        .map(|r| (r.source.clone(), r))
        .collect();

    let mut folder_plans = Vec::new();
    for (path, old_name, _) in proposals {
        let (new_name, folder_changed) = match final_names.get(&path) {
            Some(r) => (r.final_name.clone(), r.changed),
            None => (old_name.clone(), false),
        };

        let file_renames = if rename_files {
            plan_file_renames(&path, &new_name)?
        } else {
            Vec::new()
        };

        folder_plans.push(FolderPlan {
            path,
            old_name,
            new_name,
            folder_changed,
            file_renames,
        });
    }

    Ok(RenamePlan {
        root: root.to_path_buf(),
        folders: folder_plans,
    })
}

/// Plan renaming a folder's files after the folder's (final) name.
///
/// Files are sorted by name for stable numbering: the first keeps the bare
/// folder name, the i-th gets ` i+1` appended, and collisions pick up a
/// numbered suffix from the resolver.
fn plan_file_renames(folder: &Path, folder_name: &str) -> Result<Vec<FileRename>> {
    let mut files: Vec<PathBuf> = fs::read_dir(folder)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    let names: Vec<String> = files
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect();
    let mut namespace = Namespace::from_names(&names);

    let mut renames = Vec::new();
    for (i, (path, old_name)) in files.iter().zip(&names).enumerate() {
        let base = if i == 0 {
            folder_name.to_string()
        } else {
            format!("{} {}", folder_name, i + 1)
        };
        let proposed = match path.extension() {
            Some(ext) => format!("{}.{}", base, ext.to_string_lossy()),
            None => base,
        };

        let resolved = crate::naming::resolve(
            &mut namespace,
            &RenameRequest {
                source: path.clone(),
                current_name: old_name.clone(),
                proposed_name: proposed,
                kind: EntryKind::File,
            },
        )?;

        if resolved.changed {
            renames.push(FileRename {
                old_name: old_name.clone(),
                new_name: resolved.final_name,
            });
        }
    }

    Ok(renames)
}

/// Execute a plan. Folder renames run first (in plan order), then each
/// folder's file renames under its final path. Every failure is recorded
/// and the batch continues; a cancelled batch stops between items with
/// completed renames left in place.
pub fn apply(plan: &RenamePlan, cancel: &AtomicBool) -> Result<RenameReport> {
    let mut report = RenameReport::default();

    for folder in &plan.folders {
        if cancel.load(Ordering::Relaxed) {
            return Err(CleanupError::Cancelled);
        }

        let mut current_dir = folder.path.clone();
        if folder.folder_changed {
            let target = folder
                .path
                .parent()
                .unwrap_or(&plan.root)
                .join(&folder.new_name);
            match fsops::rename_entry(&folder.path, &target) {
                Ok(()) => {
                    info!("Renamed folder: '{}' -> '{}'", folder.old_name, folder.new_name);
                    report.folders_renamed += 1;
                    current_dir = target;
                }
                Err(e) => {
                    warn!("Error renaming folder '{}': {}", folder.old_name, e);
                    report.failures.push(Failure {
                        path: folder.path.clone(),
                        message: e.to_string(),
                    });
                    // File renames were planned against the new folder name
                    continue;
                }
            }
        }

        for file in &folder.file_renames {
            if cancel.load(Ordering::Relaxed) {
                return Err(CleanupError::Cancelled);
            }
            let source = current_dir.join(&file.old_name);
            let target = current_dir.join(&file.new_name);
            match fsops::rename_entry(&source, &target) {
                Ok(()) => {
                    info!("Renamed file: '{}' -> '{}'", file.old_name, file.new_name);
                    report.files_renamed += 1;
                }
                Err(e) => {
                    warn!("Error renaming file '{}': {}", file.old_name, e);
                    report.failures.push(Failure {
                        path: source,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_rules() -> RenameRules {
        RenameRules::default()
    }

    #[test]
    fn test_plan_cleans_subfolder_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("beach_trip_2019")).unwrap();
        fs::create_dir(dir.path().join("city walk")).unwrap();

        let plan = plan(dir.path(), &Scope::Auto, &default_rules(), false).unwrap();
        let mut names: Vec<(&str, &str)> = plan
            .folders
            .iter()
            .map(|f| (f.old_name.as_str(), f.new_name.as_str()))
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                ("beach_trip_2019", "Beach Trip 2019"),
                ("city walk", "City Walk"),
            ]
        );
    }

    #[test]
    fn test_longest_name_wins_contested_target() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Trip__Photos")).unwrap();
        fs::create_dir(dir.path().join("Trip_Photos!!!")).unwrap();

        let rules = RenameRules {
            remove_special: true,
            ..Default::default()
        };
        let plan = plan(dir.path(), &Scope::Auto, &rules, false).unwrap();

        let by_old: HashMap<&str, &str> = plan
            .folders
            .iter()
            .map(|f| (f.old_name.as_str(), f.new_name.as_str()))
            .collect();
        // 13 chars beats 12: the longer original takes the clean name
        assert_eq!(by_old["Trip_Photos!!!"], "Trip Photos");
        assert_eq!(by_old["Trip__Photos"], "Trip Photos (1)");
    }

    #[test]
    fn test_plan_keeps_name_when_rules_consume_it() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("abc")).unwrap();

        let rules = RenameRules {
            remove_last: 10,
            ..Default::default()
        };
        let plan = plan(dir.path(), &Scope::Auto, &rules, false).unwrap();
        assert!(!plan.folders[0].folder_changed);
        assert_eq!(plan.folders[0].new_name, "abc");
    }

    #[test]
    fn test_plan_files_follow_folder_name() {
        let dir = tempfile::tempdir().unwrap();
        let concert = dir.path().join("Concert");
        fs::create_dir(&concert).unwrap();
        fs::write(concert.join("b.mp4"), b"b").unwrap();
        fs::write(concert.join("a.mp4"), b"a").unwrap();

        let plan = plan(dir.path(), &Scope::Auto, &default_rules(), true).unwrap();
        let folder = &plan.folders[0];
        assert!(!folder.folder_changed);
        assert_eq!(
            folder.file_renames,
            vec![
                FileRename {
                    old_name: "a.mp4".to_string(),
                    new_name: "Concert.mp4".to_string(),
                },
                FileRename {
                    old_name: "b.mp4".to_string(),
                    new_name: "Concert 2.mp4".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_leaf_root_processes_its_own_files_without_renaming_itself() {
        let dir = tempfile::tempdir().unwrap();
        let leaf = dir.path().join("My Show");
        fs::create_dir(&leaf).unwrap();
        fs::write(leaf.join("video.webm"), b"v").unwrap();

        let plan = plan(&leaf, &Scope::Auto, &default_rules(), true).unwrap();
        assert_eq!(plan.folders.len(), 1);
        let folder = &plan.folders[0];
        assert!(!folder.folder_changed);
        assert_eq!(folder.file_renames[0].new_name, "My Show.webm");
    }

    #[test]
    fn test_selected_scope_ignores_other_folders() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("keep_me_a")).unwrap();
        fs::create_dir(dir.path().join("keep_me_b")).unwrap();

        let scope = Scope::Selected(vec!["keep_me_a".to_string(), "gone".to_string()]);
        let plan = plan(dir.path(), &scope, &default_rules(), false).unwrap();
        assert_eq!(plan.folders.len(), 1);
        assert_eq!(plan.folders[0].old_name, "keep_me_a");
    }

    #[test]
    fn test_apply_renames_folders_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let messy = dir.path().join("summer_hike");
        fs::create_dir(&messy).unwrap();
        fs::write(messy.join("x.jpg"), b"x").unwrap();
        fs::write(messy.join("y.jpg"), b"y").unwrap();

        let plan = plan(dir.path(), &Scope::Auto, &default_rules(), true).unwrap();
        let cancel = AtomicBool::new(false);
        let report = apply(&plan, &cancel).unwrap();

        assert_eq!(report.folders_renamed, 1);
        assert_eq!(report.files_renamed, 2);
        assert!(report.failures.is_empty());

        let renamed = dir.path().join("Summer Hike");
        assert!(renamed.is_dir());
        assert!(renamed.join("Summer Hike.jpg").exists());
        assert!(renamed.join("Summer Hike 2.jpg").exists());
    }

    #[test]
    fn test_plan_is_idempotent_on_clean_tree() {
        let dir = tempfile::tempdir().unwrap();
        let clean = dir.path().join("Tidy Folder");
        fs::create_dir(&clean).unwrap();
        fs::write(clean.join("Tidy Folder.mp4"), b"m").unwrap();

        let plan = plan(dir.path(), &Scope::Auto, &default_rules(), true).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_apply_reports_missing_folder_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("first_one")).unwrap();
        fs::create_dir(dir.path().join("second_one")).unwrap();

        let plan = plan(dir.path(), &Scope::Auto, &default_rules(), false).unwrap();
        // External interference: a planned folder disappears before apply
        fs::remove_dir(dir.path().join("first_one")).unwrap();

        let cancel = AtomicBool::new(false);
        let report = apply(&plan, &cancel).unwrap();
        assert_eq!(report.folders_renamed, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(dir.path().join("Second One").is_dir());
    }
}
