//! # zip-backup
//!
//! A one-shot backup tool that packs configured files and directories into a
//! timestamped, deflate-compressed ZIP archive.
//!
//! ## Features
//!
//! - **Mixed Sources**: files and directories in one comma-separated list
//! - **Stable Layout**: directory sources keep their folder name inside the archive
//! - **Forgiving Inputs**: missing or invalid sources are skipped with a warning
//! - **Config Formats**: INI (default) or YAML
//!
//! ## Quick Start
//!
//! ```no_run
//! use zip_backup::backup::backup_config::BackupConfig;
//!
//! // Load and check configuration
//! let config = BackupConfig::load("backup.ini")?;
//!
//! // Create `backup_<timestamp>.zip` in the destination directory
//! let archive_path = config.run_once(chrono::Local::now())?;
//! println!("{}", archive_path.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
