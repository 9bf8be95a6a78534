//! File sorter
//!
//! Sorts the files sitting directly in a source folder into per-category
//! subfolders named after their extension (`mp4/`, `pdf/`, …). Images can
//! be kept together under `images/` or split per extension. The destination
//! is either the source folder itself (move) or a separate export root
//! (move or copy). Files with no extension land in `no_extension/`.

use crate::core::error::{CleanupError, Result};
use crate::core::fsops;
use crate::naming::{claim_name, EntryKind, Namespace};
use crate::workflow::Failure;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Image extensions that the "group images" option collapses into one
/// `images/` category
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "svg", "ico",
];

/// Category folder used for files without an extension
const NO_EXTENSION: &str = "no_extension";

/// Which files to sort.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Every file in the source folder
    #[default]
    All,
    /// Only files with this extension (leading dot optional)
    Extension(String),
}

/// Whether sorted files are moved or copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOperation {
    #[default]
    Move,
    Copy,
}

/// Options for one sorting pass.
#[derive(Debug, Clone, Default)]
pub struct SortOptions {
    pub mode: SortMode,
    /// Split images per extension instead of one `images/` bucket
    pub separate_images: bool,
    /// Export root; `None` sorts in place inside the source folder
    pub export_to: Option<PathBuf>,
    pub operation: SortOperation,
}

/// Files destined for one category folder.
#[derive(Debug, Clone)]
pub struct CategoryPlan {
    pub name: String,
    pub files: Vec<PathBuf>,
}

/// The preview for one sorting pass.
#[derive(Debug, Clone)]
pub struct SortPlan {
    pub source: PathBuf,
    pub dest_base: PathBuf,
    pub operation: SortOperation,
    /// Categories in name order
    pub categories: Vec<CategoryPlan>,
}

impl SortPlan {
    pub fn file_count(&self) -> usize {
        self.categories.iter().map(|c| c.files.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Result of applying a [`SortPlan`].
#[derive(Debug, Default)]
pub struct SortReport {
    pub files_processed: usize,
    pub categories_created: usize,
    pub failures: Vec<Failure>,
}

/// Category folder name for a file.
fn category_for(path: &Path, separate_images: bool) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if ext.is_empty() {
        return NO_EXTENSION.to_string();
    }
    if !separate_images && IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return "images".to_string();
    }
    ext
}

/// Build the sorting plan for a source folder.
pub fn plan(source: &Path, options: &SortOptions) -> Result<SortPlan> {
    if source.as_os_str().is_empty() {
        return Err(CleanupError::InvalidInput(
            "Source folder must not be empty".to_string(),
        ));
    }
    if !source.is_dir() {
        return Err(CleanupError::NotADirectory(source.to_path_buf()));
    }
    if options.export_to.is_none() && options.operation == SortOperation::Copy {
        return Err(CleanupError::InvalidInput(
            "Copying in place would duplicate every file; use an export folder".to_string(),
        ));
    }

    // Normalize the extension filter once: ".MP4" and "mp4" mean the same
    let wanted_ext = match &options.mode {
        SortMode::All => None,
        SortMode::Extension(ext) => Some(ext.trim_start_matches('.').to_lowercase()),
    };

    let mut files: Vec<PathBuf> = fs::read_dir(source)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for file in files {
        if let Some(wanted) = &wanted_ext {
            let ext = file
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
                .unwrap_or_default();
            if &ext != wanted {
                continue;
            }
        }
        let category = category_for(&file, options.separate_images);
        categories.entry(category).or_default().push(file);
    }

    let dest_base = options
        .export_to
        .clone()
        .unwrap_or_else(|| source.to_path_buf());

    Ok(SortPlan {
        source: source.to_path_buf(),
        dest_base,
        operation: options.operation,
        categories: categories
            .into_iter()
            .map(|(name, files)| CategoryPlan { name, files })
            .collect(),
    })
}

/// Execute a sorting plan.
///
/// Category folders are created on demand; a folder that cannot be created
/// fails all of its files and the rest of the plan continues. Name
/// conflicts in a destination pick up numbered suffixes.
pub fn apply(plan: &SortPlan, cancel: &AtomicBool) -> Result<SortReport> {
    let mut report = SortReport::default();

    for category in &plan.categories {
        if cancel.load(Ordering::Relaxed) {
            return Err(CleanupError::Cancelled);
        }

        let category_dir = plan.dest_base.join(&category.name);
        if !category_dir.is_dir() {
            if let Err(e) = fs::create_dir_all(&category_dir) {
                warn!("Error creating folder '{}': {}", category.name, e);
                report.failures.push(Failure {
                    path: category_dir,
                    message: e.to_string(),
                });
                continue;
            }
            report.categories_created += 1;
        }

        let mut namespace = Namespace::from_dir(&category_dir)?;
        for file in &category.files {
            if cancel.load(Ordering::Relaxed) {
                return Err(CleanupError::Cancelled);
            }

            let desired = match file.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };
            let final_name = match claim_name(&mut namespace, &desired, EntryKind::File) {
                Ok(name) => name,
                Err(e) => {
                    report.failures.push(Failure {
                        path: file.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            let target = category_dir.join(&final_name);

            let result = match plan.operation {
                SortOperation::Move => fsops::move_file(file, &target),
                SortOperation::Copy => fs::copy(file, &target).map(|_| ()).map_err(|e| {
                    CleanupError::OperationError {
                        name: file.display().to_string(),
                        message: e.to_string(),
                    }
                }),
            };

            match result {
                Ok(()) => {
                    info!(
                        "{}: {} -> {}/{}",
                        match plan.operation {
                            SortOperation::Move => "Moved",
                            SortOperation::Copy => "Copied",
                        },
                        desired,
                        category.name,
                        final_name
                    );
                    report.files_processed += 1;
                }
                Err(e) => {
                    namespace.release(&final_name);
                    warn!("Error processing '{}': {}", desired, e);
                    report.failures.push(Failure {
                        path: file.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    Ok(report)
}
