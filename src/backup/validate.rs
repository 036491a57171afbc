//! Validation functions for configuration values.
//!
//! Provides custom validator functions for archive names and destination
//! paths, plus the destination check that runs right before archiving.

use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::Categorize;
use sanitize_filename::{is_sanitized, sanitize};
use validator::ValidationError;

use std::path::Path;

pub fn validate_archive_prefix<S: AsRef<str>>(name: S) -> std::result::Result<(), ValidationError> {
    let name = name.as_ref();
    if name.is_empty() {
        return Err(ValidationError::new("InvalidArchivePrefix")
            .with_message("archive prefix must not be empty".into()));
    }

    if !is_sanitized(name) {
        return Err(ValidationError::new("InvalidArchivePrefix").with_message(
            format!(
                "Invalid file name, try sanitizing like {:?}",
                sanitize(name)
            )
            .into(),
        ));
    }

    Ok(())
}

pub fn validate_non_blank_path<S: AsRef<str>>(path: S) -> std::result::Result<(), ValidationError> {
    if path.as_ref().trim().is_empty() {
        return Err(ValidationError::new("EmptyPath").with_message("path must not be empty".into()));
    }

    Ok(())
}

/// Makes sure `dir` is a directory, creating it and its parents if missing.
pub fn ensure_dir_exist_or_created<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    if dir.exists() {
        if !dir.is_dir() {
            return Err(Error::from(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{:?} is not a directory", dir),
            ))
            .into_destination_access(dir));
        }
    } else {
        tracing::info!("Creating destination directory {:?}", dir);
        std::fs::create_dir_all(dir)
            .map_err(Error::from)
            .into_destination_access(dir)?;
    }

    Ok(())
}
