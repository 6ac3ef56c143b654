//! Core data types used throughout parbak
//!
//! This module contains the data structures shared across the pipeline:
//! the file records produced by scanning, the session configuration, and
//! the statistics returned by processing runs.
//!
//! ## Overview
//!
//! - **File system state**: [`FileRecord`], one regular file found by a scan
//! - **Configuration**: [`SessionConfig`], read-only for a session lifetime
//! - **Operation results**: [`ProcessStats`], [`BackupReport`],
//!   [`RestoreOutcome`]

use std::path::PathBuf;

/// Default obfuscation key byte, applied unless the operator overrides it
pub const DEFAULT_CIPHER_KEY: u8 = 0xAE;

/// A regular file discovered by a directory scan
///
/// Immutable after creation; owned by the session's file list for the
/// duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path of the file on disk
    pub absolute_path: PathBuf,
    /// Path relative to the scan root; never empty, never contains the root
    pub relative_path: PathBuf,
    /// File size in bytes at scan time
    pub size: u64,
}

/// Aggregate byte count of a scanned file list
pub fn total_size(files: &[FileRecord]) -> u64 {
    files.iter().map(|f| f.size).sum()
}

/// Configuration for one backup or restore session
///
/// Set once at session start and never mutated by workers. The cipher is a
/// byte-wise XOR used for reversible obfuscation only; it carries no
/// confidentiality or integrity guarantee.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Whether the obfuscation transform is applied
    pub cipher_enabled: bool,
    /// Single key byte XORed with every content byte
    pub cipher_key: u8,
    /// Directory receiving archives and staging trees
    pub output_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cipher_enabled: false,
            cipher_key: DEFAULT_CIPHER_KEY,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Outcome of one parallel processing run over a file list
///
/// `completed + skipped.len()` equals the input list length. Skips are
/// accumulated rather than silently dropped so callers can surface an
/// aggregate count to the operator.
#[derive(Debug, Default)]
pub struct ProcessStats {
    /// Files whose per-file action finished successfully
    pub completed: usize,
    /// Relative paths of files skipped after a per-file failure
    pub skipped: Vec<PathBuf>,
}

/// Summary of a completed backup
#[derive(Debug)]
pub struct BackupReport {
    /// Final archive location
    pub archive_path: PathBuf,
    /// Files copied into the staging tree
    pub files_processed: usize,
    /// Files skipped after per-file I/O failures
    pub files_skipped: usize,
    /// Size of the packed archive in bytes
    pub archive_size: u64,
}

/// Summary of a completed restore
#[derive(Debug)]
pub struct RestoreOutcome {
    /// Directory the archive was extracted into
    pub restore_dir: PathBuf,
    /// Files reverse-transformed (0 when the cipher is disabled)
    pub files_processed: usize,
    /// Files that failed the reverse transform and were left as extracted
    pub files_skipped: usize,
}
