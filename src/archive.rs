//! Archive packing and unpacking via the external `tar` binary
//!
//! All archive work is delegated to the system `tar` through
//! [`std::process::Command`]; the crate never parses or emits the tar format
//! itself. [`ArchivePort`] is the seam the rest of the pipeline talks to, so
//! sessions and restores never build command lines directly and tests can
//! substitute a stub.
//!
//! Success of every invocation is judged solely by the child's exit status.
//! A non-zero exit is an error carrying the captured stderr; stdout of the
//! listing call is parsed as one entry per line. The `-C` flag pins tar's
//! working directory instead of changing the parent process's.

use crate::error::{BackupError, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, trace};

/// Seam between the pipeline and the external archiver
///
/// Implementations must treat only a zero exit status as success and must
/// never require a particular process working directory.
pub trait ArchivePort: Send + Sync {
    /// Pack `dir` (a staging tree) into a gzip-compressed archive at
    /// `archive`. The archive's top-level entry is `dir`'s final component.
    fn pack(&self, dir: &Path, archive: &Path) -> Result<()>;

    /// List entry names inside `archive`, one per line of the archiver's
    /// output
    fn list_entries(&self, archive: &Path) -> Result<Vec<String>>;

    /// Extract `archive` into `dest`, which must already exist
    ///
    /// With `strip_top_level` set, the single leading path component of every
    /// entry is removed so the staging directory's contents land directly in
    /// `dest`.
    fn unpack(&self, archive: &Path, dest: &Path, strip_top_level: bool) -> Result<()>;
}

/// [`ArchivePort`] backed by the system `tar` binary
#[derive(Debug, Clone, Default)]
pub struct TarArchiver;

impl TarArchiver {
    /// Create an archiver
    pub fn new() -> Self {
        Self
    }
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

impl ArchivePort for TarArchiver {
    fn pack(&self, dir: &Path, archive: &Path) -> Result<()> {
        let parent = dir
            .parent()
            .ok_or_else(|| BackupError::pack(format!("staging dir {dir:?} has no parent")))?;
        let name = dir
            .file_name()
            .ok_or_else(|| BackupError::pack(format!("staging dir {dir:?} has no name")))?;

        debug!("Packing {:?} into {:?}", dir, archive);
        let output = Command::new("tar")
            .arg("-czf")
            .arg(archive)
            .arg("-C")
            .arg(parent)
            .arg(name)
            .output()
            .map_err(|e| BackupError::pack(format!("failed to launch tar: {e}")))?;

        if !output.status.success() {
            return Err(BackupError::pack(format!(
                "tar exited with {}: {}",
                output.status,
                stderr_of(&output)
            )));
        }
        Ok(())
    }

    fn list_entries(&self, archive: &Path) -> Result<Vec<String>> {
        let output = Command::new("tar")
            .arg("-tzf")
            .arg(archive)
            .output()
            .map_err(|e| BackupError::unpack(format!("failed to launch tar: {e}")))?;

        if !output.status.success() {
            return Err(BackupError::unpack(format!(
                "tar -t exited with {}: {}",
                output.status,
                stderr_of(&output)
            )));
        }

        let entries: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect();
        trace!("Archive {:?} holds {} entries", archive, entries.len());
        Ok(entries)
    }

    fn unpack(&self, archive: &Path, dest: &Path, strip_top_level: bool) -> Result<()> {
        debug!(
            "Unpacking {:?} into {:?} (strip_top_level={})",
            archive, dest, strip_top_level
        );
        let mut cmd = Command::new("tar");
        cmd.arg("-xzf").arg(archive).arg("-C").arg(dest);
        if strip_top_level {
            cmd.arg("--strip-components=1");
        }

        let output = cmd
            .output()
            .map_err(|e| BackupError::unpack(format!("failed to launch tar: {e}")))?;

        if !output.status.success() {
            return Err(BackupError::unpack(format!(
                "tar -x exited with {}: {}",
                output.status,
                stderr_of(&output)
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_staging(root: &Path) -> std::path::PathBuf {
        let staging = root.join("temp_snap");
        fs::create_dir_all(staging.join("sub")).unwrap();
        fs::write(staging.join("a.txt"), b"alpha").unwrap();
        fs::write(staging.join("sub/b.txt"), b"beta").unwrap();
        staging
    }

    #[test]
    fn test_pack_then_list() {
        let temp_dir = TempDir::new().unwrap();
        let staging = make_staging(temp_dir.path());
        let archive = temp_dir.path().join("snap.tar.gz");

        let archiver = TarArchiver::new();
        archiver.pack(&staging, &archive).unwrap();
        assert!(archive.is_file());

        let entries = archiver.list_entries(&archive).unwrap();
        assert!(entries.iter().any(|e| e.contains("a.txt")));
        assert!(entries.iter().any(|e| e.contains("sub/b.txt")));
        // Entries are rooted at the staging directory name.
        assert!(entries.iter().all(|e| e.starts_with("temp_snap")));
    }

    #[test]
    fn test_unpack_with_strip_flattens_top_level() {
        let temp_dir = TempDir::new().unwrap();
        let staging = make_staging(temp_dir.path());
        let archive = temp_dir.path().join("snap.tar.gz");
        let dest = temp_dir.path().join("out");
        fs::create_dir(&dest).unwrap();

        let archiver = TarArchiver::new();
        archiver.pack(&staging, &archive).unwrap();
        archiver.unpack(&archive, &dest, true).unwrap();

        assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(fs::read(dest.join("sub/b.txt")).unwrap(), b"beta");
        assert!(!dest.join("temp_snap").exists());
    }

    #[test]
    fn test_unpack_without_strip_keeps_top_level() {
        let temp_dir = TempDir::new().unwrap();
        let staging = make_staging(temp_dir.path());
        let archive = temp_dir.path().join("snap.tar.gz");
        let dest = temp_dir.path().join("out");
        fs::create_dir(&dest).unwrap();

        let archiver = TarArchiver::new();
        archiver.pack(&staging, &archive).unwrap();
        archiver.unpack(&archive, &dest, false).unwrap();

        assert_eq!(fs::read(dest.join("temp_snap/a.txt")).unwrap(), b"alpha");
    }

    #[test]
    fn test_pack_missing_dir_fails_with_nonzero_exit() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("snap.tar.gz");

        let err = TarArchiver::new()
            .pack(&temp_dir.path().join("does_not_exist"), &archive)
            .unwrap_err();
        assert!(matches!(err, BackupError::Pack(_)));
    }

    #[test]
    fn test_list_rejects_non_archive() {
        let temp_dir = TempDir::new().unwrap();
        let bogus = temp_dir.path().join("not_an_archive.tar.gz");
        fs::write(&bogus, b"plainly not gzip").unwrap();

        let err = TarArchiver::new().list_entries(&bogus).unwrap_err();
        assert!(matches!(err, BackupError::Unpack(_)));
    }
}
