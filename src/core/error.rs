//! Error types for the import folder cleanup tool
//!
//! This module defines the error types used throughout the application.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the import folder cleanup tool
#[derive(Error, Debug)]
pub enum CleanupError {
    /// Invalid parameters, rejected before any filesystem access
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The selected folder does not exist or is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// General I/O error
    #[error("IO error: {0}")]
    IoError(String),

    /// A single rename/move/delete failed
    #[error("Operation failed for '{name}': {message}")]
    OperationError { name: String, message: String },

    /// The numbered-suffix search ran past the defensive cap
    #[error("Could not find a free name for '{name}' after {attempts} attempts")]
    DisambiguationOverflow { name: String, attempts: u32 },

    /// Fingerprints computed under different algorithms were compared
    #[error("Fingerprint algorithm mismatch: {0} vs {1}")]
    AlgorithmMismatch(String, String),

    /// The operation was cancelled before it completed
    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CleanupError>;

impl From<std::io::Error> for CleanupError {
    fn from(err: std::io::Error) -> Self {
        CleanupError::IoError(err.to_string())
    }
}
