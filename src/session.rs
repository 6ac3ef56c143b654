//! Backup session orchestration
//!
//! A [`BackupSession`] owns the configuration and file list for one run and
//! drives the pipeline end to end: scan, parallel copy (with the optional
//! byte transform), pack, clean up. The staging tree `temp_<name>` is built
//! under the configured output directory and removed only after the archive
//! has been packed successfully; on a pack failure the staging tree is left
//! in place for inspection.
//!
//! Content flows through fixed 8 KiB chunks so memory use stays flat no
//! matter how large an individual file is. Chunk boundaries do not affect the
//! transform because each byte is independent of its neighbors.

use crate::archive::{ArchivePort, TarArchiver};
use crate::cipher::StreamCipher;
use crate::error::{BackupError, Result};
use crate::processor::{DirGuard, ParallelFileProcessor};
use crate::progress::ProgressReporter;
use crate::scanner::DirectoryScanner;
use crate::types::{total_size, BackupReport, FileRecord, SessionConfig};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Copy buffer size for per-file streaming
pub const CHUNK_SIZE: usize = 8192;

/// One backup run: scan, transform, pack
pub struct BackupSession {
    config: SessionConfig,
    file_list: Vec<FileRecord>,
    archiver: Box<dyn ArchivePort>,
}

impl BackupSession {
    /// Create a session with the default `tar`-backed archiver
    pub fn new(config: SessionConfig) -> Self {
        Self::with_archiver(config, Box::new(TarArchiver::new()))
    }

    /// Create a session with a caller-supplied archiver
    pub fn with_archiver(config: SessionConfig, archiver: Box<dyn ArchivePort>) -> Self {
        Self {
            config,
            file_list: Vec::new(),
            archiver,
        }
    }

    /// The session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Files found by the most recent scan
    pub fn file_list(&self) -> &[FileRecord] {
        &self.file_list
    }

    /// Scan `root` and replace the session file list with the result
    pub fn scan_folder(&mut self, root: &Path) -> Result<&[FileRecord]> {
        self.file_list = DirectoryScanner::new().scan(root)?;
        Ok(&self.file_list)
    }

    /// Copy every scanned file into a staging tree, pack it, and return the
    /// archive summary
    ///
    /// Requires a prior successful [`scan_folder`](Self::scan_folder) that
    /// found at least one file. Individual copy failures skip the file and
    /// are reported in [`BackupReport::files_skipped`]; a pack failure is
    /// fatal and preserves the staging tree.
    pub fn create_backup(&self, name: &str) -> Result<BackupReport> {
        if self.file_list.is_empty() {
            return Err(BackupError::EmptyFileList);
        }

        let staging = self.config.output_dir.join(format!("temp_{name}"));
        let archive_path = self.config.output_dir.join(format!("{name}.tar.gz"));

        fs::create_dir_all(&staging)?;
        info!(
            "Backing up {} files ({} bytes) into {:?}",
            self.file_list.len(),
            total_size(&self.file_list),
            archive_path
        );

        let cipher = self
            .config
            .cipher_enabled
            .then(|| StreamCipher::new(self.config.cipher_key));
        let guard = DirGuard::new();
        let reporter = ProgressReporter::new(self.file_list.len());

        let stats = ParallelFileProcessor::new().process(&self.file_list, &reporter, |record| {
            let dest = staging.join(&record.relative_path);
            if let Some(parent) = dest.parent() {
                guard.ensure(parent)?;
            }
            copy_transformed(&record.absolute_path, &dest, cipher.as_ref())
        })?;
        reporter.finish();

        if !stats.skipped.is_empty() {
            warn!("{} files skipped during copy", stats.skipped.len());
        }

        self.archiver.pack(&staging, &archive_path)?;

        // The staging tree survives pack failures; only a packed archive
        // earns the cleanup.
        if let Err(e) = fs::remove_dir_all(&staging) {
            warn!("Could not remove staging tree {:?}: {}", staging, e);
        }

        let archive_size = fs::metadata(&archive_path)?.len();
        debug!("Archive {:?} is {} bytes", archive_path, archive_size);

        Ok(BackupReport {
            archive_path,
            files_processed: stats.completed,
            files_skipped: stats.skipped.len(),
            archive_size,
        })
    }
}

/// Stream `src` into `dest` through fixed-size chunks, applying the optional
/// transform to each chunk
pub fn copy_transformed(src: &Path, dest: &Path, cipher: Option<&StreamCipher>) -> Result<()> {
    let mut reader = BufReader::new(File::open(src)?);
    let mut writer = BufWriter::new(File::create(dest)?);
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        if let Some(cipher) = cipher {
            cipher.apply(&mut buf[..n]);
        }
        writer.write_all(&buf[..n])?;
    }
    writer.flush()?;
    Ok(())
}
