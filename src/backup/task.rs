use crate::backup::archive::plan_entries;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::Categorize;
use crate::backup::source::SourceEntry;
use crate::backup::zip::{create_zip_archive, ZipConfig};

use chrono::{DateTime, TimeZone};
use getset::Getters;
use std::fmt::Display;
use std::path::PathBuf;

/// Fixed width, so names sort lexically by creation time
static TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// One archiving run: what to pack, where, and under which file name.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct ArchiveTask {
    sources: Vec<SourceEntry>,
    destination: PathBuf,
    file_name: String,
}

pub fn archive_file_name<O: Display, T: TimeZone<Offset = O>>(
    prefix: &str,
    ext: &str,
    dt: &DateTime<T>,
) -> String {
    format!("{}_{}.{}", prefix, dt.format(TIME_FORMAT), ext)
}

impl ArchiveTask {
    pub fn new<O: Display, T: TimeZone<Offset = O>>(
        sources: Vec<SourceEntry>,
        destination: PathBuf,
        zip_config: &ZipConfig,
        dt: DateTime<T>,
    ) -> Self {
        let file_name = archive_file_name(zip_config.archive_prefix(), zip_config.file_ext(), &dt);
        Self {
            sources,
            destination,
            file_name,
        }
    }

    pub fn archive_path(&self) -> PathBuf {
        self.destination.join(&self.file_name)
    }

    /// Builds the archive. The destination directory must already exist.
    pub fn run(&self, zip_config: &ZipConfig) -> Result<PathBuf> {
        let archive_path = self.archive_path();
        tracing::info!(
            "Creating {:?} from {} source(s)",
            archive_path,
            self.sources.len()
        );

        let entries = plan_entries(&self.sources).into_archive_write(&archive_path)?;
        create_zip_archive(&archive_path, &entries, zip_config)?;
        Ok(archive_path)
    }
}
