//! Filesystem operation helpers
//!
//! Small wrappers around `std::fs` that deal with the two quirks every
//! workflow here runs into: case-only renames on case-insensitive
//! filesystems, and moves that cross filesystem boundaries.

use crate::core::error::{CleanupError, Result};
use log::trace;
use std::fs;
use std::path::Path;

/// Rename an entry, handling the case-only rename quirk.
///
/// On case-insensitive filesystems some platforms reject `Foo` → `foo`
/// because the target "already exists". When source and target differ only
/// by case and the direct rename fails, the entry is routed through a
/// temporary name in the same directory.
pub fn rename_entry(source: &Path, target: &Path) -> Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(e) => {
            let case_only = source
                .file_name()
                .zip(target.file_name())
                .map(|(a, b)| {
                    let a = a.to_string_lossy();
                    let b = b.to_string_lossy();
                    a != b && a.to_lowercase() == b.to_lowercase()
                })
                .unwrap_or(false);

            if !case_only {
                return Err(op_error(source, &e));
            }

            trace!(
                "Direct case-only rename failed ({}), using two-step rename",
                e
            );
            let temp = target.with_file_name(format!(
                "{}.__casetmp__",
                target.file_name().unwrap_or_default().to_string_lossy()
            ));
            fs::rename(source, &temp).map_err(|e| op_error(source, &e))?;
            fs::rename(&temp, target).map_err(|e| op_error(&temp, &e))
        }
    }
}

/// Move a file, falling back to copy-then-delete when the rename crosses a
/// filesystem boundary.
pub fn move_file(source: &Path, target: &Path) -> Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(source, target).map_err(|e| op_error(source, &e))?;
            fs::remove_file(source).map_err(|e| op_error(source, &e))
        }
    }
}

fn op_error(path: &Path, e: &std::io::Error) -> CleanupError {
    CleanupError::OperationError {
        name: path.display().to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_entry_plain() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("old.txt");
        let dst = dir.path().join("new.txt");
        fs::write(&src, b"x").unwrap();

        rename_entry(&src, &dst).unwrap();
        assert!(!src.exists());
        assert!(dst.exists());
    }

    #[test]
    fn test_rename_entry_case_only() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("Mixed.txt");
        let dst = dir.path().join("mixed.txt");
        fs::write(&src, b"x").unwrap();

        rename_entry(&src, &dst).unwrap();
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["mixed.txt".to_string()]);
    }

    #[test]
    fn test_move_file_same_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let src = dir.path().join("a.bin");
        fs::write(&src, b"payload").unwrap();

        move_file(&src, &sub.join("a.bin")).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(sub.join("a.bin")).unwrap(), b"payload");
    }

    #[test]
    fn test_move_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = move_file(&dir.path().join("ghost"), &dir.path().join("out"));
        assert!(err.is_err());
    }
}
