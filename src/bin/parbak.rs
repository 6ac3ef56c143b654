//! # parbak CLI - Parallel backup and restore
//!
//! Command-line interface for the parbak pipeline.
//!
//! ## Features
//! - Scan a directory tree and preview what a backup would contain
//! - Create compressed `.tar.gz` backups with parallel file processing
//! - Optional reversible byte obfuscation (XOR, not encryption)
//! - Restore archives with automatic de-obfuscation
//!
//! ## Usage
//! ```bash
//! # Preview the files a backup would contain
//! parbak scan ./my_project
//!
//! # Create a backup archive
//! parbak backup nightly ./my_project -o ./backups
//!
//! # Create an obfuscated backup
//! parbak -e backup nightly ./my_project
//!
//! # Restore it (same flags reverse the transform)
//! parbak -e restore ./backups/nightly.tar.gz
//! ```

use clap::{Parser, Subcommand};
use colored::*;
use humantime::format_duration;
use parbak::{
    total_size, BackupError, BackupSession, DirectoryScanner, Result, RestoreCoordinator,
    SessionConfig, DEFAULT_CIPHER_KEY,
};
use std::path::PathBuf;
use std::time::Instant;

/// Number of file records shown before the list is elided
const LIST_PREVIEW: usize = 10;

/// parbak CLI - Parallel backup and restore with reversible obfuscation
#[derive(Parser)]
#[command(name = "parbak")]
#[command(version = "0.1")]
#[command(about = "Parallel directory backup and restore with reversible obfuscation")]
#[command(long_about = None)]
struct Cli {
    /// Apply the reversible byte transform (obfuscation, not encryption)
    #[arg(short = 'e', long = "encrypt", global = true)]
    encrypt: bool,

    /// Transform key byte, decimal or 0x-prefixed hex
    #[arg(long, global = true, default_value = "0xAE", value_parser = parse_key_byte)]
    key: u8,

    /// Output directory for archives (defaults to current)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory and list the files a backup would contain
    Scan {
        /// Directory to scan
        path: PathBuf,
    },

    /// Create a backup archive
    #[command(alias = "bk")]
    Backup {
        /// Backup name (archive becomes <name>.tar.gz)
        name: String,

        /// Directory to back up
        path: PathBuf,
    },

    /// Restore a backup archive
    #[command(alias = "rs")]
    Restore {
        /// Archive to restore
        archive: PathBuf,

        /// Destination directory (defaults to restored_<name> beside the archive)
        dest: Option<PathBuf>,
    },
}

fn parse_key_byte(s: &str) -> std::result::Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|_| format!("'{s}' is not a byte value (use 0-255 or 0x00-0xFF)"))
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    // Disable colors if needed
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    // Run command
    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main command runner
fn run(cli: Cli) -> Result<()> {
    let config = SessionConfig {
        cipher_enabled: cli.encrypt,
        cipher_key: cli.key,
        output_dir: cli.output.unwrap_or_else(|| PathBuf::from(".")),
    };

    if config.cipher_enabled && config.cipher_key != DEFAULT_CIPHER_KEY {
        tracing::debug!("Using custom transform key 0x{:02X}", config.cipher_key);
    }

    match cli.command {
        Commands::Scan { path } => cmd_scan(path),
        Commands::Backup { name, path } => cmd_backup(config, name, path),
        Commands::Restore { archive, dest } => cmd_restore(config, archive, dest),
    }
}

/// Scan a directory and print the file list preview
fn cmd_scan(path: PathBuf) -> Result<()> {
    println!("{} {}", "Scanning".blue().bold(), path.display());

    let start = Instant::now();
    let files = DirectoryScanner::new().scan(&path)?;
    let duration = start.elapsed();

    println!(
        "{} Found {} files ({})",
        "✓".green().bold(),
        files.len().to_string().cyan(),
        format_bytes(total_size(&files)).cyan()
    );

    for file in files.iter().take(LIST_PREVIEW) {
        println!(
            "  {} ({})",
            file.relative_path.display(),
            format_bytes(file.size).dimmed()
        );
    }
    if files.len() > LIST_PREVIEW {
        println!(
            "  {}",
            format!("... and {} more", files.len() - LIST_PREVIEW).dimmed()
        );
    }

    println!("  Time: {}", format_duration(duration).to_string().cyan());
    Ok(())
}

/// Create a backup archive from a directory
fn cmd_backup(config: SessionConfig, name: String, path: PathBuf) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(BackupError::internal(format!(
            "invalid backup name '{name}' (must be non-empty, no slashes)"
        )));
    }

    println!(
        "{} {} {} {}",
        "Backing up".blue().bold(),
        path.display(),
        "as".blue().bold(),
        name.yellow()
    );
    if config.cipher_enabled {
        println!(
            "  {}",
            "Contents will be obfuscated (reversible XOR, not encryption)".yellow()
        );
    }

    let start = Instant::now();
    let mut session = BackupSession::new(config);
    session.scan_folder(&path)?;
    println!(
        "  Files: {}",
        session.file_list().len().to_string().cyan()
    );

    let report = session.create_backup(&name)?;
    let duration = start.elapsed();

    println!("{} Backup complete", "✓".green().bold());
    println!("  Archive: {}", report.archive_path.display().to_string().cyan());
    println!("  Files: {}", report.files_processed.to_string().cyan());
    if report.files_skipped > 0 {
        println!(
            "  Skipped: {}",
            report.files_skipped.to_string().yellow().bold()
        );
    }
    println!("  Size: {}", format_bytes(report.archive_size).cyan());
    println!("  Time: {}", format_duration(duration).to_string().cyan());

    Ok(())
}

/// Restore a backup archive
fn cmd_restore(config: SessionConfig, archive: PathBuf, dest: Option<PathBuf>) -> Result<()> {
    println!(
        "{} {}",
        "Restoring".blue().bold(),
        archive.display().to_string().yellow()
    );

    let start = Instant::now();
    let cipher_enabled = config.cipher_enabled;
    let outcome = RestoreCoordinator::new(config).restore(&archive, dest.as_deref())?;
    let duration = start.elapsed();

    println!("{} Restore complete", "✓".green().bold());
    println!(
        "  Directory: {}",
        outcome.restore_dir.display().to_string().cyan()
    );
    if cipher_enabled {
        println!(
            "  De-obfuscated: {}",
            outcome.files_processed.to_string().cyan()
        );
        if outcome.files_skipped > 0 {
            println!(
                "  Skipped: {}",
                outcome.files_skipped.to_string().yellow().bold()
            );
        }
    }
    println!("  Time: {}", format_duration(duration).to_string().cyan());

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_byte() {
        assert_eq!(parse_key_byte("0xAE").unwrap(), 0xAE);
        assert_eq!(parse_key_byte("0Xae").unwrap(), 0xAE);
        assert_eq!(parse_key_byte("174").unwrap(), 174);
        assert_eq!(parse_key_byte("0").unwrap(), 0);
        assert!(parse_key_byte("256").is_err());
        assert!(parse_key_byte("0x100").is_err());
        assert!(parse_key_byte("key").is_err());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
