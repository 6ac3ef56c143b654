//! Recursive directory enumeration
//!
//! Produces the ordered file list that drives a backup run. The scan walks
//! every subdirectory under the root, records one [`FileRecord`] per regular
//! file, and reports the aggregate byte count for operator visibility.
//!
//! Failure policy: an unreadable directory is logged and skipped, and the
//! scan continues with its siblings (partial result). An entry whose
//! metadata lookup fails after the listing already found it (a race between
//! listing and stat) is silently omitted at trace level; this mirrors the
//! long-standing behavior of the tool rather than guessing stricter
//! semantics.

use crate::error::{BackupError, Result};
use crate::types::{total_size, FileRecord};
use std::path::Path;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

/// Directory scanner producing the session file list
#[derive(Debug, Default)]
pub struct DirectoryScanner;

impl DirectoryScanner {
    /// Create a scanner
    pub fn new() -> Self {
        Self
    }

    /// Recursively enumerate every regular file under `root`
    ///
    /// The returned records carry absolute paths, root-relative paths, and
    /// sizes. Insertion order is traversal order; it is not guaranteed to be
    /// stable across runs on filesystems without ordered directory entries.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::InvalidRoot`] if `root` is not a directory and
    /// [`BackupError::WalkDir`] if the root itself cannot be read.
    /// Unreadable subdirectories are not fatal.
    pub fn scan(&self, root: &Path) -> Result<Vec<FileRecord>> {
        if !root.is_dir() {
            return Err(BackupError::InvalidRoot(root.to_path_buf()));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // An error on the root itself means nothing was scanned.
                    if e.depth() == 0 {
                        return Err(e.into());
                    }
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    // Listing found the entry but stat lost the race; drop it.
                    trace!("Omitting {:?}: {}", entry.path(), e);
                    continue;
                }
            };

            let relative_path = match entry.path().strip_prefix(root) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => {
                    warn!("Entry {:?} is not under scan root, skipping", entry.path());
                    continue;
                }
            };

            debug!("Found {:?} ({} bytes)", relative_path, metadata.len());
            files.push(FileRecord {
                absolute_path: entry.path().to_path_buf(),
                relative_path,
                size: metadata.len(),
            });
        }

        info!(
            "Scanned {:?}: {} files, {} bytes total",
            root,
            files.len(),
            total_size(&files)
        );

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();

        let files = DirectoryScanner::new().scan(temp_dir.path()).unwrap();

        assert!(files.is_empty());
        assert_eq!(total_size(&files), 0);
    }

    #[test]
    fn test_scan_nested_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.txt"), b"12345").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/b.txt"), b"0123456789").unwrap();

        let files = DirectoryScanner::new().scan(root).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(total_size(&files), 15);
        assert!(files.iter().any(|f| f.relative_path == PathBuf::from("a.txt") && f.size == 5));
        assert!(files
            .iter()
            .any(|f| f.relative_path == PathBuf::from("sub/b.txt") && f.size == 10));
    }

    #[test]
    fn test_relative_paths_never_contain_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("x/y")).unwrap();
        fs::write(root.join("x/y/deep.txt"), b"deep").unwrap();
        fs::write(root.join("top.txt"), b"top").unwrap();

        let files = DirectoryScanner::new().scan(root).unwrap();

        for file in &files {
            assert!(!file.relative_path.as_os_str().is_empty());
            assert!(!file.relative_path.starts_with(root));
            assert!(file.relative_path.is_relative());
            assert_eq!(file.absolute_path, root.join(&file.relative_path));
        }
    }

    #[test]
    fn test_scan_rejects_non_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("file.txt");
        fs::write(&file_path, b"not a dir").unwrap();

        let err = DirectoryScanner::new().scan(&file_path).unwrap_err();
        assert!(matches!(err, BackupError::InvalidRoot(_)));

        let missing = temp_dir.path().join("missing");
        let err = DirectoryScanner::new().scan(&missing).unwrap_err();
        assert!(matches!(err, BackupError::InvalidRoot(_)));
    }

    #[test]
    fn test_directories_are_not_records() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("only/dirs/here")).unwrap();

        let files = DirectoryScanner::new().scan(root).unwrap();
        assert!(files.is_empty());
    }
}
