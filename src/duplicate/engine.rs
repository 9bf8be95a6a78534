//! Duplicate detection engine
//!
//! Finds content-identical files under a root directory using a staged
//! filter, so the expensive full-content hash is only ever paid for files
//! that already matched on size and on their first 64 KiB:
//!
//! 1. **Collect**: enumerate files in scope, apply size/type filters, group
//!    by exact byte size, drop unique sizes.
//! 2. **Partial filter**: hash the first 64 KiB of each survivor, regroup by
//!    `(size, partial digest)`, drop singletons.
//! 3. **Full confirm**: hash the complete content of the remainder, regroup
//!    by full digest, drop singletons. Prefix equality does not imply
//!    content equality, so this stage is not optional.
//! 4. **Materialize**: each surviving group becomes a [`DuplicateGroup`]
//!    with members in lexicographic path order; the first member is the
//!    canonical one that actions keep.
//!
//! Hashing stages run on the rayon pool; results are merged back into the
//! grouping maps by a single writer, so group membership is deterministic
//! and independent of thread scheduling. Per-file I/O errors land in a skip
//! list and never abort the scan.

use crate::core::error::{CleanupError, Result};
use crate::duplicate::fingerprint::{
    self, FullFingerprint, HashAlgorithm, PartialFingerprint,
};
use log::{debug, info, trace};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Extensions treated as media when scanning with [`TypeFilter::MediaOnly`]
const MEDIA_EXTENSIONS: &[&str] = &[
    // Images
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "svg", "ico",
    // Videos
    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "m2ts", "ts",
    // Audio
    "mp3", "wav", "flac", "aac", "m4a", "ogg", "wma",
];

/// Which files participate in a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    /// Every regular file
    All,
    /// Only known image/video/audio extensions
    #[default]
    MediaOnly,
}

/// Parameters for one duplicate scan.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Directory to scan
    pub root: PathBuf,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Files below this size are never considered
    pub min_size_bytes: u64,
    /// Media-only or all files
    pub type_filter: TypeFilter,
    /// Hash family for both fingerprint stages
    pub algorithm: HashAlgorithm,
}

/// Snapshot of one file taken at collect time.
///
/// Size is not re-statted by later stages; a file changed mid-scan surfaces
/// as a hash error, not a silent mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
}

/// Files sharing one full-content fingerprint, two or more of them.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub fingerprint: FullFingerprint,
    /// Shared byte size of every member
    pub size: u64,
    /// Members in lexicographic path order; the first is canonical
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// The member kept by default when the group is acted on.
    pub fn canonical(&self) -> &FileRecord {
        &self.files[0]
    }

    /// Every member except the canonical one.
    pub fn duplicates(&self) -> &[FileRecord] {
        &self.files[1..]
    }

    /// Bytes that would be reclaimed by removing the non-canonical members.
    pub fn wasted_bytes(&self) -> u64 {
        self.size * (self.files.len() as u64 - 1)
    }
}

/// A file dropped from the scan, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a completed scan.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Duplicate groups, ordered by canonical path
    pub groups: Vec<DuplicateGroup>,
    /// Files dropped due to I/O errors
    pub skipped: Vec<SkippedFile>,
    /// Files that passed the collect filters
    pub files_considered: usize,
    pub scan_duration: Duration,
}

impl ScanOutcome {
    /// Total non-canonical files across all groups.
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.files.len() - 1).sum()
    }

    /// Total bytes reclaimable by removing all non-canonical members.
    pub fn wasted_bytes(&self) -> u64 {
        self.groups.iter().map(|g| g.wasted_bytes()).sum()
    }
}

/// Which stage a progress report refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStage {
    Collect,
    PartialHash,
    FullHash,
}

/// Progress report delivered through the scan callback.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    pub stage: ScanStage,
    pub processed: usize,
    /// Unknown while collecting
    pub total: Option<usize>,
}

/// Run a full duplicate scan.
///
/// `cancel` is checked between file-level units of work; a cancelled scan
/// returns [`CleanupError::Cancelled`] and discards partial results.
pub fn scan<F>(request: &ScanRequest, cancel: &AtomicBool, progress: F) -> Result<ScanOutcome>
where
    F: Fn(ScanProgress) + Send + Sync,
{
    validate(request)?;
    let started = Instant::now();
    let mut skipped = Vec::new();

    // Stage 1: collect and bucket by size
    info!("Collecting files under {}", request.root.display());
    let size_groups = collect_by_size(request, cancel, &mut skipped, &progress)?;
    let files_considered = size_groups.values().map(Vec::len).sum::<usize>();

    let candidates: Vec<FileRecord> = size_groups
        .into_values()
        .filter(|files| files.len() > 1)
        .flatten()
        .collect();
    debug!(
        "{} of {} files share a size with at least one other",
        candidates.len(),
        files_considered
    );

    // Stage 2: partial fingerprint over (size, prefix digest)
    let partial_groups = group_by_partial(request, candidates, cancel, &mut skipped, &progress)?;
    let survivors: Vec<FileRecord> = partial_groups
        .into_values()
        .filter(|files| files.len() > 1)
        .flatten()
        .collect();
    debug!("{} files survived the partial filter", survivors.len());

    // Stage 3: full fingerprint confirmation
    let full_groups = group_by_full(request, survivors, cancel, &mut skipped, &progress)?;

    // Stage 4: materialize deterministic groups
    let mut groups: Vec<DuplicateGroup> = full_groups
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(fingerprint, mut files)| {
            files.sort_by(|a, b| a.path.cmp(&b.path));
            let size = files[0].size;
            DuplicateGroup {
                fingerprint,
                size,
                files,
            }
        })
        .collect();
    groups.sort_by(|a, b| a.canonical().path.cmp(&b.canonical().path));

    info!(
        "Scan complete: {} duplicate groups, {} skipped files, {:.1}s",
        groups.len(),
        skipped.len(),
        started.elapsed().as_secs_f64()
    );

    Ok(ScanOutcome {
        groups,
        skipped,
        files_considered,
        scan_duration: started.elapsed(),
    })
}

fn validate(request: &ScanRequest) -> Result<()> {
    if request.root.as_os_str().is_empty() {
        return Err(CleanupError::InvalidInput(
            "Scan root must not be empty".to_string(),
        ));
    }
    if !request.root.is_dir() {
        return Err(CleanupError::NotADirectory(request.root.clone()));
    }
    Ok(())
}

fn is_media_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MEDIA_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn collect_by_size<F>(
    request: &ScanRequest,
    cancel: &AtomicBool,
    skipped: &mut Vec<SkippedFile>,
    progress: &F,
) -> Result<HashMap<u64, Vec<FileRecord>>>
where
    F: Fn(ScanProgress) + Send + Sync,
{
    let max_depth = if request.recursive { usize::MAX } else { 1 };
    let mut size_groups: HashMap<u64, Vec<FileRecord>> = HashMap::new();
    let mut seen = 0usize;

    let walker = WalkDir::new(&request.root)
        .follow_links(false)
        .max_depth(max_depth);

    for entry in walker {
        if cancel.load(Ordering::Relaxed) {
            return Err(CleanupError::Cancelled);
        }

        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| request.root.clone());
                skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        if request.type_filter == TypeFilter::MediaOnly && !is_media_file(path) {
            continue;
        }

        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                trace!("Failed to stat {}: {}", path.display(), e);
                skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if size < request.min_size_bytes {
            continue;
        }

        size_groups.entry(size).or_default().push(FileRecord {
            path: path.to_path_buf(),
            size,
        });

        seen += 1;
        if seen % 100 == 0 {
            progress(ScanProgress {
                stage: ScanStage::Collect,
                processed: seen,
                total: None,
            });
        }
    }

    Ok(size_groups)
}

/// Outcome of hashing one file on the pool.
enum HashStep<K> {
    Done(K, FileRecord),
    Failed(SkippedFile),
    Cancelled,
}

fn group_by_partial<F>(
    request: &ScanRequest,
    candidates: Vec<FileRecord>,
    cancel: &AtomicBool,
    skipped: &mut Vec<SkippedFile>,
    progress: &F,
) -> Result<HashMap<PartialFingerprint, Vec<FileRecord>>>
where
    F: Fn(ScanProgress) + Send + Sync,
{
    let total = candidates.len();
    let processed = AtomicUsize::new(0);

    let steps: Vec<HashStep<PartialFingerprint>> = candidates
        .into_par_iter()
        .map(|record| {
            if cancel.load(Ordering::Relaxed) {
                return HashStep::Cancelled;
            }
            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % 50 == 0 || done == total {
                progress(ScanProgress {
                    stage: ScanStage::PartialHash,
                    processed: done,
                    total: Some(total),
                });
            }
            match fingerprint::partial_fingerprint(&record.path, record.size, request.algorithm) {
                Ok(fp) => HashStep::Done(fp, record),
                Err(e) => HashStep::Failed(SkippedFile {
                    path: record.path,
                    reason: e.to_string(),
                }),
            }
        })
        .collect();

    merge_steps(steps, cancel, skipped)
}

fn group_by_full<F>(
    request: &ScanRequest,
    survivors: Vec<FileRecord>,
    cancel: &AtomicBool,
    skipped: &mut Vec<SkippedFile>,
    progress: &F,
) -> Result<HashMap<FullFingerprint, Vec<FileRecord>>>
where
    F: Fn(ScanProgress) + Send + Sync,
{
    let total = survivors.len();
    let processed = AtomicUsize::new(0);

    let steps: Vec<HashStep<FullFingerprint>> = survivors
        .into_par_iter()
        .map(|record| {
            if cancel.load(Ordering::Relaxed) {
                return HashStep::Cancelled;
            }
            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % 20 == 0 || done == total {
                progress(ScanProgress {
                    stage: ScanStage::FullHash,
                    processed: done,
                    total: Some(total),
                });
            }
            match fingerprint::full_fingerprint(&record.path, request.algorithm) {
                Ok(fp) => HashStep::Done(fp, record),
                Err(e) => HashStep::Failed(SkippedFile {
                    path: record.path,
                    reason: e.to_string(),
                }),
            }
        })
        .collect();

    merge_steps(steps, cancel, skipped)
}

/// Fold parallel hash results into a grouping map under a single writer.
fn merge_steps<K: std::hash::Hash + Eq>(
    steps: Vec<HashStep<K>>,
    cancel: &AtomicBool,
    skipped: &mut Vec<SkippedFile>,
) -> Result<HashMap<K, Vec<FileRecord>>> {
    if cancel.load(Ordering::SeqCst) {
        return Err(CleanupError::Cancelled);
    }

    let mut groups: HashMap<K, Vec<FileRecord>> = HashMap::new();
    for step in steps {
        match step {
            HashStep::Done(key, record) => groups.entry(key).or_default().push(record),
            HashStep::Failed(skip) => {
                trace!("Skipping {}: {}", skip.path.display(), skip.reason);
                skipped.push(skip);
            }
            HashStep::Cancelled => return Err(CleanupError::Cancelled),
        }
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::AtomicBool;

    fn request(root: &Path) -> ScanRequest {
        ScanRequest {
            root: root.to_path_buf(),
            recursive: true,
            min_size_bytes: 0,
            type_filter: TypeFilter::All,
            algorithm: HashAlgorithm::Sha256,
        }
    }

    fn run(request: &ScanRequest) -> ScanOutcome {
        let cancel = AtomicBool::new(false);
        scan(request, &cancel, |_| {}).unwrap()
    }

    #[test]
    fn test_groups_identical_content_only() {
        let dir = tempfile::tempdir().unwrap();
        let x = vec![7u8; 512];
        let mut y = x.clone();
        y[100] = 8; // same size, different content
        fs::write(dir.path().join("a.bin"), &x).unwrap();
        fs::write(dir.path().join("b.bin"), &x).unwrap();
        fs::write(dir.path().join("c.bin"), &y).unwrap();

        let outcome = run(&request(dir.path()));
        assert_eq!(outcome.groups.len(), 1);
        let group = &outcome.groups[0];
        assert_eq!(group.files.len(), 2);
        assert_eq!(group.canonical().path, dir.path().join("a.bin"));
        assert_eq!(group.duplicates()[0].path, dir.path().join("b.bin"));
        assert_eq!(group.size, 512);
        assert_eq!(group.wasted_bytes(), 512);
    }

    #[test]
    fn test_min_size_short_circuits_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), b"tiny twin").unwrap();
        fs::write(dir.path().join("b.bin"), b"tiny twin").unwrap();

        let mut req = request(dir.path());
        req.min_size_bytes = 1024;
        let outcome = run(&req);
        assert!(outcome.groups.is_empty());
        assert_eq!(outcome.files_considered, 0);
    }

    #[test]
    fn test_shared_prefix_does_not_make_a_group() {
        // Same size, same first 64 KiB, divergence past the prefix.
        let dir = tempfile::tempdir().unwrap();
        let mut a = vec![1u8; 70_000];
        let mut b = a.clone();
        a[69_000] = 2;
        b[69_000] = 3;
        fs::write(dir.path().join("a.bin"), &a).unwrap();
        fs::write(dir.path().join("b.bin"), &b).unwrap();

        let outcome = run(&request(dir.path()));
        assert!(outcome.groups.is_empty());
    }

    #[test]
    fn test_non_recursive_scan_ignores_subfolders() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.bin"), b"payload").unwrap();
        fs::write(dir.path().join("sub/b.bin"), b"payload").unwrap();

        let mut req = request(dir.path());
        req.recursive = false;
        let outcome = run(&req);
        assert!(outcome.groups.is_empty());

        req.recursive = true;
        let outcome = run(&req);
        assert_eq!(outcome.groups.len(), 1);
    }

    #[test]
    fn test_media_only_filter() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"same bytes").unwrap();
        fs::write(dir.path().join("b.txt"), b"same bytes").unwrap();
        fs::write(dir.path().join("a.jpg"), b"same image").unwrap();
        fs::write(dir.path().join("b.JPG"), b"same image").unwrap();

        let mut req = request(dir.path());
        req.type_filter = TypeFilter::MediaOnly;
        let outcome = run(&req);
        assert_eq!(outcome.groups.len(), 1);
        assert!(outcome.groups[0]
            .files
            .iter()
            .all(|f| is_media_file(&f.path)));
    }

    #[test]
    fn test_group_members_and_groups_are_path_ordered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["z.bin", "m.bin", "a.bin"] {
            fs::write(dir.path().join(name), b"first set").unwrap();
        }
        for name in ["y.bin", "b.bin"] {
            fs::write(dir.path().join(name), b"second set!").unwrap();
        }

        let outcome = run(&request(dir.path()));
        assert_eq!(outcome.groups.len(), 2);
        // Canonical members are the lexicographically smallest paths, and
        // groups are ordered by their canonical members.
        assert_eq!(outcome.groups[0].canonical().path, dir.path().join("a.bin"));
        assert_eq!(outcome.groups[1].canonical().path, dir.path().join("b.bin"));
        let paths: Vec<_> = outcome.groups[0].files.iter().map(|f| &f.path).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }

    #[test]
    fn test_cancelled_scan_discards_results() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), b"data").unwrap();

        let cancel = AtomicBool::new(true);
        let result = scan(&request(dir.path()), &cancel, |_| {});
        assert!(matches!(result, Err(CleanupError::Cancelled)));
    }

    #[test]
    fn test_invalid_roots_rejected_before_io() {
        let cancel = AtomicBool::new(false);

        let req = request(Path::new(""));
        assert!(matches!(
            scan(&req, &cancel, |_| {}),
            Err(CleanupError::InvalidInput(_))
        ));

        let req = request(Path::new("/definitely/not/here"));
        assert!(matches!(
            scan(&req, &cancel, |_| {}),
            Err(CleanupError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_duplicate_count_and_waste() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.bin", "b.bin", "c.bin"] {
            fs::write(dir.path().join(name), vec![9u8; 100]).unwrap();
        }

        let outcome = run(&request(dir.path()));
        assert_eq!(outcome.duplicate_count(), 2);
        assert_eq!(outcome.wasted_bytes(), 200);
    }
}
