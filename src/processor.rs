//! Parallel fan-out/fan-in over a file list
//!
//! [`ParallelFileProcessor`] distributes independent per-file actions across
//! a rayon worker pool with dynamic, unordered scheduling: no guarantee about
//! which worker processes which file or in what order files complete. Each
//! file's action runs to completion on its worker; results are deterministic
//! regardless of completion order because no state is shared beyond the two
//! guarded pieces below.
//!
//! Shared state under mutual exclusion:
//! - destination-directory creation, serialized by [`DirGuard`] so workers
//!   targeting the same new parent never race on `mkdir`;
//! - the completion counter inside [`ProgressReporter`], incremented exactly
//!   once per file.
//!
//! A per-file failure does not abort the run: the file is skipped with a
//! warning and recorded in [`ProcessStats::skipped`] so callers can surface
//! an aggregate skip count instead of silently producing incomplete output.
//!
//! There is no cancellation or timeout support; once started, a run proceeds
//! to completion.

use crate::error::{BackupError, Result};
use crate::progress::ProgressReporter;
use crate::types::{FileRecord, ProcessStats};
use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Mutex-serialized, idempotent directory creation
///
/// A second worker's creation attempt on an already-existing directory is
/// not an error.
#[derive(Debug, Default)]
pub struct DirGuard {
    lock: Mutex<()>,
}

impl DirGuard {
    /// Create a guard
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `dir` and all its parents exist
    pub fn ensure(&self, dir: &Path) -> Result<()> {
        let _held = self.lock.lock();
        fs::create_dir_all(dir)?;
        Ok(())
    }
}

/// Worker pool applying one action per file
#[derive(Debug)]
pub struct ParallelFileProcessor {
    workers: usize,
}

impl Default for ParallelFileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelFileProcessor {
    /// Create a processor sized to the machine's logical CPUs
    pub fn new() -> Self {
        Self {
            workers: num_cpus::get(),
        }
    }

    /// Override the worker count (minimum 1)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Run `action` for every record, fanning out across the pool
    ///
    /// The progress counter reaches exactly `files.len()` once the run
    /// completes, counting skipped files as well, so the rendered indicator
    /// always converges on the total. `ProcessStats::completed` counts only
    /// the files whose action succeeded.
    pub fn process<F>(
        &self,
        files: &[FileRecord],
        reporter: &ProgressReporter,
        action: F,
    ) -> Result<ProcessStats>
    where
        F: Fn(&FileRecord) -> Result<()> + Send + Sync,
    {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| BackupError::internal(format!("thread pool: {e}")))?;

        debug!("Processing {} files on {} workers", files.len(), self.workers);

        let skipped: Vec<_> = pool.install(|| {
            files
                .par_iter()
                .filter_map(|record| {
                    let outcome = action(record);
                    reporter.file_done(&record.relative_path.to_string_lossy());
                    match outcome {
                        Ok(()) => None,
                        Err(e) => {
                            warn!("Skipping {:?}: {}", record.relative_path, e);
                            Some(record.relative_path.clone())
                        }
                    }
                })
                .collect()
        });

        Ok(ProcessStats {
            completed: files.len() - skipped.len(),
            skipped,
        })
    }
}
