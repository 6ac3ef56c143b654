//! Error types for parbak
//!
//! All fallible operations in the crate return [`Result<T>`]. The error enum
//! distinguishes fatal pipeline conditions (missing archive, failed pack)
//! from the per-file conditions that the pipeline skips and accumulates.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results in the parbak crate
pub type Result<T> = std::result::Result<T, BackupError>;

/// Main error type for all backup and restore operations
#[derive(Debug, Error)]
pub enum BackupError {
    /// I/O errors during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Walk directory error from walkdir crate
    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Scan root is missing or not a directory
    #[error("Not a directory: {0:?}")]
    InvalidRoot(PathBuf),

    /// Backup requested before a scan produced any files
    #[error("No files to back up; run a scan first")]
    EmptyFileList,

    /// Archive file missing at restore start
    #[error("Backup archive not found: {0:?}")]
    ArchiveNotFound(PathBuf),

    /// External archiver failed while packing the staging tree
    #[error("Archive pack failed: {0}")]
    Pack(String),

    /// External archiver failed on both extraction attempts
    #[error("Archive unpack failed: {0}")]
    Unpack(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BackupError {
    /// Create a pack error with a custom message
    pub fn pack(msg: impl Into<String>) -> Self {
        BackupError::Pack(msg.into())
    }

    /// Create an unpack error with a custom message
    pub fn unpack(msg: impl Into<String>) -> Self {
        BackupError::Unpack(msg.into())
    }

    /// Create an internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        BackupError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackupError::ArchiveNotFound(PathBuf::from("missing.tar.gz"));
        assert_eq!(
            err.to_string(),
            "Backup archive not found: \"missing.tar.gz\""
        );
    }

    #[test]
    fn test_error_helpers() {
        assert!(matches!(BackupError::pack("tar exited 2"), BackupError::Pack(_)));
        assert!(matches!(BackupError::unpack("no entries"), BackupError::Unpack(_)));
        assert!(matches!(BackupError::internal("oops"), BackupError::Internal(_)));
    }
}
