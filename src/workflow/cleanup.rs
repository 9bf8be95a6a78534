//! Folder cleanup
//!
//! Structural tidying after an import: flatten single-level subfolders into
//! their parent, sweep out temp/cache junk, zero-byte media, files with
//! unwanted extensions, and finally empty folders. Like the other
//! workflows, `plan` previews and `apply` executes with per-item outcomes.
//!
//! Flattening depends on scope. Without a selection, each folder in scope
//! has its *flat* subfolders (folders containing only files) emptied into
//! it. With an explicit selection, the selected folders themselves are
//! emptied wholesale (files and subfolders) into the root.

use crate::core::error::{CleanupError, Result};
use crate::core::fsops;
use crate::naming::{claim_name, EntryKind, Namespace};
use crate::workflow::{folders_in_scope, validate_root, Failure, Scope};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

/// Extensions of media files whose zero-byte copies are junk
const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v",
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "svg", "ico",
];

/// Extensions of partial downloads and scratch files
const TEMP_EXTENSIONS: &[&str] = &["tmp", "temp", "part", "download", "crdownload", "partial"];

/// Well-known junk file names (compared lowercase)
const TEMP_NAMES: &[&str] = &[
    "thumbs.db",
    ".ds_store",
    "desktop.ini",
    ".localized",
    ".fseventsd",
    ".spotlight-v100",
    ".trashes",
];

/// Which cleanup steps to run.
#[derive(Debug, Clone, Default)]
pub struct CleanupOptions {
    pub flatten: bool,
    pub remove_empty: bool,
    pub remove_temp: bool,
    pub remove_zero_byte_media: bool,
    /// Extra extensions to sweep (leading dots optional); empty disables
    pub custom_extensions: Vec<String>,
}

/// One folder to be emptied into a target directory.
#[derive(Debug, Clone)]
pub struct FlattenItem {
    pub source_folder: PathBuf,
    pub target_dir: PathBuf,
    pub files: Vec<PathBuf>,
    /// Subfolders moved along with the files (selected-folder mode only)
    pub folders: Vec<PathBuf>,
}

/// The preview for one cleanup pass.
#[derive(Debug, Clone, Default)]
pub struct CleanupPlan {
    pub root: PathBuf,
    /// The folders the scope resolved to at plan time; the empty-folder
    /// sweep stays inside these
    pub scope_folders: Vec<PathBuf>,
    pub flatten: Vec<FlattenItem>,
    pub temp_files: Vec<PathBuf>,
    pub zero_byte_media: Vec<PathBuf>,
    pub custom_extension_files: Vec<PathBuf>,
    /// Folders empty right now; apply re-checks after the other steps so
    /// folders emptied by flattening are removed in the same pass
    pub empty_folders: Vec<PathBuf>,
}

impl CleanupPlan {
    pub fn is_empty(&self) -> bool {
        self.flatten.is_empty()
            && self.temp_files.is_empty()
            && self.zero_byte_media.is_empty()
            && self.custom_extension_files.is_empty()
            && self.empty_folders.is_empty()
    }

    pub fn removal_count(&self) -> usize {
        self.temp_files.len() + self.zero_byte_media.len() + self.custom_extension_files.len()
    }
}

/// Result of applying a [`CleanupPlan`].
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub entries_moved: usize,
    pub files_removed: usize,
    pub folders_removed: usize,
    pub failures: Vec<Failure>,
}

fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Folders under `parent` that contain only files.
fn find_flat_folders(parent: &Path) -> Result<Vec<PathBuf>> {
    let mut flat = Vec::new();
    for entry in fs::read_dir(parent)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let contents: Vec<PathBuf> = fs::read_dir(&path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        if !contents.is_empty() && contents.iter().all(|p| p.is_file()) {
            flat.push(path);
        }
    }
    flat.sort();
    Ok(flat)
}

fn has_extension_in(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_temp_file(path: &Path) -> bool {
    if has_extension_in(path, TEMP_EXTENSIONS) {
        return true;
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if TEMP_NAMES.contains(&name.as_str()) {
        return true;
    }
    // Hidden cache leftovers like ".cache-xyz" or ".tmp_upload"
    name.starts_with('.') && ["cache", "temp", "tmp"].iter().any(|m| name.contains(m))
}

fn walk_files(folder: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(folder)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
}

/// All folders under `parent`, deepest first so nested empties unwind.
fn folders_deepest_first(parent: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = WalkDir::new(parent)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().to_path_buf())
        .collect();
    dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
    dirs
}

fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut i| i.next().is_none())
        .unwrap_or(false)
}

/// Folders under `parent` that are empty right now, deepest first.
fn find_empty_folders(parent: &Path) -> Vec<PathBuf> {
    folders_deepest_first(parent)
        .into_iter()
        .filter(|d| is_empty_dir(d))
        .collect()
}

/// Build the cleanup plan for a root folder.
pub fn plan(root: &Path, scope: &Scope, options: &CleanupOptions) -> Result<CleanupPlan> {
    validate_root(root)?;
    let folders = folders_in_scope(root, scope)?;
    let selected = matches!(scope, Scope::Selected(_));

    let mut plan = CleanupPlan {
        root: root.to_path_buf(),
        scope_folders: folders.clone(),
        ..Default::default()
    };

    let custom: Vec<String> = options
        .custom_extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    for folder in &folders {
        if options.flatten {
            if selected {
                // The selected folder itself is emptied into the root
                let mut files = Vec::new();
                let mut subdirs = Vec::new();
                for entry in fs::read_dir(folder)? {
                    let path = entry?.path();
                    if path.is_dir() {
                        subdirs.push(path);
                    } else {
                        files.push(path);
                    }
                }
                files.sort();
                subdirs.sort();
                if !files.is_empty() || !subdirs.is_empty() {
                    plan.flatten.push(FlattenItem {
                        source_folder: folder.clone(),
                        target_dir: root.to_path_buf(),
                        files,
                        folders: subdirs,
                    });
                }
            } else {
                for flat in find_flat_folders(folder)? {
                    let files = sorted_files(&flat)?;
                    plan.flatten.push(FlattenItem {
                        source_folder: flat,
                        target_dir: folder.clone(),
                        files,
                        folders: Vec::new(),
                    });
                }
            }
        }

        for file in walk_files(folder) {
            if options.remove_temp && is_temp_file(&file) {
                plan.temp_files.push(file.clone());
            }
            if !custom.is_empty() {
                let ext = file
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_lowercase())
                    .unwrap_or_default();
                if custom.contains(&ext) {
                    plan.custom_extension_files.push(file.clone());
                }
            }
            if options.remove_zero_byte_media
                && has_extension_in(&file, MEDIA_EXTENSIONS)
                && fs::metadata(&file).map(|m| m.len() == 0).unwrap_or(false)
            {
                plan.zero_byte_media.push(file.clone());
            }
        }

        if options.remove_empty {
            plan.empty_folders.extend(find_empty_folders(folder));
        }
    }

    Ok(plan)
}

fn remove_listed_files(
    label: &str,
    files: &[PathBuf],
    cancel: &AtomicBool,
    report: &mut CleanupReport,
) -> Result<()> {
    for file in files {
        if cancel.load(Ordering::Relaxed) {
            return Err(CleanupError::Cancelled);
        }
        match fs::remove_file(file) {
            Ok(()) => {
                info!("Removed {}: {}", label, file.display());
                report.files_removed += 1;
            }
            Err(e) => {
                warn!("Error removing '{}': {}", file.display(), e);
                report.failures.push(Failure {
                    path: file.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Execute a cleanup plan: flatten, sweep files, then remove empty folders.
///
/// Empty-folder removal re-scans at apply time (deepest first), so folders
/// emptied by the flatten step disappear in the same pass.
pub fn apply(
    plan: &CleanupPlan,
    options: &CleanupOptions,
    cancel: &AtomicBool,
) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    for item in &plan.flatten {
        if cancel.load(Ordering::Relaxed) {
            return Err(CleanupError::Cancelled);
        }
        flatten_one(item, cancel, &mut report)?;

        // Drop the emptied source folder; skip silently if something new
        // appeared inside it meanwhile
        match fs::remove_dir(&item.source_folder) {
            Ok(()) => {
                info!("Removed empty folder: {}", item.source_folder.display());
                report.folders_removed += 1;
            }
            Err(e) => {
                warn!(
                    "Folder '{}' not removed: {}",
                    item.source_folder.display(),
                    e
                );
            }
        }
    }

    remove_listed_files("temp file", &plan.temp_files, cancel, &mut report)?;
    remove_listed_files("zero-byte media", &plan.zero_byte_media, cancel, &mut report)?;
    remove_listed_files(
        "custom extension file",
        &plan.custom_extension_files,
        cancel,
        &mut report,
    )?;

    if options.remove_empty {
        // Deepest first, emptiness checked at removal time: a chain of
        // nested empty folders unwinds in one pass
        for scope_folder in &plan.scope_folders {
            if !scope_folder.is_dir() {
                // Flattening may have removed it already
                continue;
            }
            for folder in folders_deepest_first(scope_folder) {
                if cancel.load(Ordering::Relaxed) {
                    return Err(CleanupError::Cancelled);
                }
                if !is_empty_dir(&folder) {
                    continue;
                }
                match fs::remove_dir(&folder) {
                    Ok(()) => {
                        info!("Removed empty folder: {}", folder.display());
                        report.folders_removed += 1;
                    }
                    Err(e) => {
                        warn!("Error removing empty folder '{}': {}", folder.display(), e);
                        report.failures.push(Failure {
                            path: folder,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    Ok(report)
}

fn flatten_one(item: &FlattenItem, cancel: &AtomicBool, report: &mut CleanupReport) -> Result<()> {
    let mut namespace = Namespace::from_dir(&item.target_dir)?;
    // The folder being emptied occupies a slot in its own target; that slot
    // frees up only after it is removed, so keep it claimed while moving.

    for (entries, kind) in [
        (&item.files, EntryKind::File),
        (&item.folders, EntryKind::Folder),
    ] {
        for entry in entries {
            if cancel.load(Ordering::Relaxed) {
                return Err(CleanupError::Cancelled);
            }

            let desired = match entry.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };
            let final_name = match claim_name(&mut namespace, &desired, kind) {
                Ok(name) => name,
                Err(e) => {
                    report.failures.push(Failure {
                        path: entry.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            let target = item.target_dir.join(&final_name);

            let result = match kind {
                EntryKind::File => fsops::move_file(entry, &target),
                EntryKind::Folder => fsops::rename_entry(entry, &target),
            };
            match result {
                Ok(()) => {
                    info!("Moved: {} -> {}", entry.display(), target.display());
                    report.entries_moved += 1;
                }
                Err(e) => {
                    namespace.release(&final_name);
                    warn!("Error moving '{}': {}", entry.display(), e);
                    report.failures.push(Failure {
                        path: entry.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    Ok(())
}
