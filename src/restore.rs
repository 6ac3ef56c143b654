//! Archive extraction and reverse transform
//!
//! [`RestoreCoordinator`] is the inverse of the backup flow: it unpacks an
//! archive into a destination directory and, when the session cipher is
//! enabled, walks the extracted tree and reverses the byte transform on every
//! file in place.
//!
//! Extraction is attempted twice: first with the archive's single top-level
//! directory stripped so the backed-up tree lands directly in the
//! destination, then without stripping for archives that were not produced by
//! this tool's staging layout. Only after both attempts fail is the error
//! surfaced.
//!
//! The in-place reverse transform writes each file's transformed bytes to a
//! `<file>.decrypt_tmp` sibling and renames it over the original, so a crash
//! mid-file never leaves a half-transformed original. Stray temp files from
//! an interrupted earlier run are swept before and after the pass.

use crate::archive::{ArchivePort, TarArchiver};
use crate::cipher::StreamCipher;
use crate::error::{BackupError, Result};
use crate::processor::ParallelFileProcessor;
use crate::progress::ProgressReporter;
use crate::scanner::DirectoryScanner;
use crate::session::copy_transformed;
use crate::types::{RestoreOutcome, SessionConfig};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Suffix of the sibling temp file used by the in-place reverse transform
pub const DECRYPT_TMP_SUFFIX: &str = ".decrypt_tmp";

/// Number of archive entries shown in the pre-extraction preview
const PREVIEW_ENTRIES: usize = 10;

/// Unpack-and-reverse driver for one archive
pub struct RestoreCoordinator {
    config: SessionConfig,
    archiver: Box<dyn ArchivePort>,
}

impl RestoreCoordinator {
    /// Create a coordinator with the default `tar`-backed archiver
    pub fn new(config: SessionConfig) -> Self {
        Self::with_archiver(config, Box::new(TarArchiver::new()))
    }

    /// Create a coordinator with a caller-supplied archiver
    pub fn with_archiver(config: SessionConfig, archiver: Box<dyn ArchivePort>) -> Self {
        Self { config, archiver }
    }

    /// Extract `archive` and reverse the transform if the cipher is enabled
    ///
    /// The destination is `dest` when supplied, otherwise a `restored_<name>`
    /// sibling of the archive. Returns [`BackupError::ArchiveNotFound`]
    /// before touching the filesystem if the archive does not exist.
    pub fn restore(&self, archive: &Path, dest: Option<&Path>) -> Result<RestoreOutcome> {
        if !archive.is_file() {
            return Err(BackupError::ArchiveNotFound(archive.to_path_buf()));
        }

        // Extraction runs with tar's own working directory (-C), so the
        // archive path must stay valid from anywhere.
        let archive = archive.canonicalize()?;
        let restore_dir = match dest {
            Some(dir) => dir.to_path_buf(),
            None => default_restore_dir(&archive),
        };
        fs::create_dir_all(&restore_dir)?;

        match self.archiver.list_entries(&archive) {
            Ok(entries) => {
                info!("Archive holds {} entries", entries.len());
                for entry in entries.iter().take(PREVIEW_ENTRIES) {
                    debug!("  {}", entry);
                }
            }
            Err(e) => warn!("Could not preview archive contents: {}", e),
        }

        self.unpack_with_fallback(&archive, &restore_dir)?;

        let (files_processed, files_skipped) = if self.config.cipher_enabled {
            self.reverse_transform(&restore_dir)?
        } else {
            (0, 0)
        };

        info!("Restored into {:?}", restore_dir);
        Ok(RestoreOutcome {
            restore_dir,
            files_processed,
            files_skipped,
        })
    }

    /// Try stripped extraction first; archives not produced by the staging
    /// layout fall back to a plain extraction.
    fn unpack_with_fallback(&self, archive: &Path, dest: &Path) -> Result<()> {
        match self.archiver.unpack(archive, dest, true) {
            Ok(()) => Ok(()),
            Err(first) => {
                warn!("Stripped extraction failed ({}), retrying without", first);
                self.archiver.unpack(archive, dest, false)
            }
        }
    }

    /// Walk the extracted tree and reverse the transform on every file
    fn reverse_transform(&self, restore_dir: &Path) -> Result<(usize, usize)> {
        sweep_temp_files(restore_dir);

        let files = DirectoryScanner::new().scan(restore_dir)?;
        if files.is_empty() {
            return Ok((0, 0));
        }

        info!("Reversing transform on {} files", files.len());
        let cipher = StreamCipher::new(self.config.cipher_key);
        let reporter = ProgressReporter::new(files.len());

        let stats = ParallelFileProcessor::new().process(&files, &reporter, |record| {
            reverse_file_in_place(&record.absolute_path, &cipher)
        })?;
        reporter.finish();

        sweep_temp_files(restore_dir);

        if !stats.skipped.is_empty() {
            warn!(
                "{} files failed the reverse transform and were left as extracted",
                stats.skipped.len()
            );
        }
        Ok((stats.completed, stats.skipped.len()))
    }
}

/// `restored_<archive base name minus .tar.gz>`, next to the archive
fn default_restore_dir(archive: &Path) -> PathBuf {
    let base = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = base
        .strip_suffix(".tar.gz")
        .or_else(|| base.strip_suffix(".tgz"))
        .unwrap_or(&base);
    let dir_name = format!("restored_{base}");
    match archive.parent() {
        Some(parent) => parent.join(dir_name),
        None => PathBuf::from(dir_name),
    }
}

/// Transform one file in place via a temp sibling and rename
fn reverse_file_in_place(path: &Path, cipher: &StreamCipher) -> Result<()> {
    let tmp = temp_sibling(path);
    copy_transformed(path, &tmp, Some(cipher))?;

    if let Err(rename_err) = fs::rename(&tmp, path) {
        // Some filesystems refuse the rename; the external move is the
        // last resort before giving the file up.
        debug!("Rename {:?} failed ({}), trying mv", tmp, rename_err);
        let status = Command::new("mv")
            .arg(&tmp)
            .arg(path)
            .status()
            .map_err(|e| BackupError::internal(format!("failed to launch mv: {e}")))?;
        if !status.success() {
            let _ = fs::remove_file(&tmp);
            return Err(BackupError::internal(format!(
                "could not move {tmp:?} over {path:?} (mv exited with {status})"
            )));
        }
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(DECRYPT_TMP_SUFFIX);
    PathBuf::from(name)
}

/// Remove leftover temp files from an interrupted run; best effort
fn sweep_temp_files(root: &Path) {
    for entry in walkdir::WalkDir::new(root).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let is_temp = entry
            .path()
            .extension()
            .map(|ext| ext == OsStr::new(DECRYPT_TMP_SUFFIX.trim_start_matches('.')))
            .unwrap_or(false);
        if is_temp {
            debug!("Removing stray temp file {:?}", entry.path());
            if let Err(e) = fs::remove_file(entry.path()) {
                warn!("Could not remove {:?}: {}", entry.path(), e);
            }
        }
    }
}
