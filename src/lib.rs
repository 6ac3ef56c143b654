//! # parbak - Parallel backup and restore with reversible obfuscation
//!
//! A backup tool that scans a directory tree, optionally obfuscates file
//! contents with a byte-wise XOR transform, packages the tree into a single
//! compressed `.tar.gz` archive via the external `tar` utility, and reverses
//! the whole process on restore.
//!
//! ## Overview
//!
//! A backup run flows through four stages:
//!
//! - **Scan**: [`DirectoryScanner`] enumerates every regular file under the
//!   source root into an ordered list of [`FileRecord`]s
//! - **Transform + copy**: [`ParallelFileProcessor`] fans the list out across
//!   a rayon worker pool; each worker streams its file into a staging tree in
//!   fixed 8 KiB chunks, applying [`StreamCipher`] when enabled
//! - **Pack**: the staging tree is handed to the external archiver behind
//!   [`ArchivePort`] and becomes one `.tar.gz`
//! - **Restore**: [`RestoreCoordinator`] extracts the archive (with a
//!   fallback extraction strategy) and reverses the transform in place
//!
//! Progress across workers converges on one [`ProgressReporter`] whose
//! completion counter is exact regardless of scheduling order.
//!
//! ## Obfuscation, not encryption
//!
//! The byte transform XORs every content byte with a single session key byte.
//! It is trivially reversible by anyone holding (or guessing) the key and
//! provides **no confidentiality, integrity, or authenticity**. The only
//! property the pipeline relies on is that applying the transform twice
//! restores the original bytes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parbak::{BackupSession, RestoreCoordinator, SessionConfig};
//! use std::path::{Path, PathBuf};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig {
//!     cipher_enabled: true,
//!     cipher_key: 0xAE,
//!     output_dir: PathBuf::from("./backups"),
//! };
//!
//! let mut session = BackupSession::new(config.clone());
//! session.scan_folder(Path::new("./my_project"))?;
//! let report = session.create_backup("my_project")?;
//! println!("Packed {} files into {:?}", report.files_processed, report.archive_path);
//!
//! let outcome = RestoreCoordinator::new(config).restore(&report.archive_path, None)?;
//! println!("Restored into {:?}", outcome.restore_dir);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod cipher;
pub mod error;
pub mod processor;
pub mod progress;
pub mod restore;
pub mod scanner;
pub mod session;
pub mod types;

pub use archive::{ArchivePort, TarArchiver};
pub use cipher::StreamCipher;
pub use error::{BackupError, Result};
pub use processor::{DirGuard, ParallelFileProcessor};
pub use progress::ProgressReporter;
pub use restore::RestoreCoordinator;
pub use scanner::DirectoryScanner;
pub use session::BackupSession;
pub use types::{
    total_size, BackupReport, FileRecord, ProcessStats, RestoreOutcome, SessionConfig,
    DEFAULT_CIPHER_KEY,
};
