use crate::backup::archive::ArchiveEntry;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{Categorize, WithMsg};
use crate::backup::validate::validate_archive_prefix;

use bon::Builder;
use chrono::{DateTime, Datelike, Local, Timelike};
use getset::Getters;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use validator::Validate;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use std::fs::File;
use std::io::{BufWriter, IntoInnerError, Seek, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

static DEFAULT_ARCHIVE_PREFIX: &str = "backup";
static ZIP_FILE_EXT: &str = "zip";
/// Members at or above this size need ZIP64 headers
const LARGE_FILE_THRESHOLD: u64 = u32::MAX as u64;

/// Settings of the `[archive]` configuration section
///
/// Values may come from INI files, where everything is a string, so the
/// compression level also accepts its decimal text form.
#[serde_as]
#[derive(Clone, Default, Validate, Serialize, Deserialize, Debug, Builder, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct ZipConfig {
    /// File name prefix, `backup` when unset
    #[validate(custom(function = validate_archive_prefix))]
    #[builder(into)]
    prefix: Option<Arc<str>>,

    /// Deflate level (0-9), codec default when unset
    #[validate(range(min = 0, max = 9))]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    compression_level: Option<i64>,
}

impl ZipConfig {
    pub fn archive_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(DEFAULT_ARCHIVE_PREFIX)
    }

    pub fn file_ext(&self) -> &'static str {
        ZIP_FILE_EXT
    }

    fn file_options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(self.compression_level)
    }
}

/// Creates the ZIP archive at `archive_path` holding every entry, in order.
///
/// The file must not exist yet. On failure the partially written file is
/// left where it is. Returns the number of members written.
pub fn create_zip_archive<P: AsRef<Path>>(
    archive_path: P,
    entries: &[ArchiveEntry],
    config: &ZipConfig,
) -> Result<usize> {
    let archive_path = archive_path.as_ref();
    write_zip_archive(archive_path, entries, config).into_archive_write(archive_path)
}

fn write_zip_archive(
    archive_path: &Path,
    entries: &[ArchiveEntry],
    config: &ZipConfig,
) -> Result<usize> {
    let file = File::create_new(archive_path)
        .map_err(Error::from)
        .with_msg(format!("Opening archive {:?} failed", archive_path))?;

    // dropping the writer on an early return still writes the central directory
    let mut writer = ZipWriter::new(BufWriter::new(file));

    for entry in entries {
        append_entry(&mut writer, entry, config)
            .with_msg(format!("Adding {:?} as {:?} failed", entry.src, entry.dst))?;
    }

    writer
        .finish()?
        .into_inner()
        .map_err(IntoInnerError::into_error)?
        .sync_all()?;

    tracing::info!("Processed {} archive entries", entries.len());
    Ok(entries.len())
}

/// Streams one source file into the archive as a deflated member.
pub fn append_entry<W: Write + Seek>(
    writer: &mut ZipWriter<W>,
    entry: &ArchiveEntry,
    config: &ZipConfig,
) -> Result<()> {
    let mut src = File::open(&entry.src)?;
    let metadata = src.metadata()?;

    let mut options = config
        .file_options()
        .large_file(metadata.len() >= LARGE_FILE_THRESHOLD);
    if let Some(modified) = metadata.modified().ok().and_then(zip_date_time) {
        options = options.last_modified_time(modified);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(metadata.permissions().mode());
    }

    tracing::debug!("Adding {:?} as {:?}", entry.src, entry.dst);
    writer.start_file(&*entry.dst, options)?;
    std::io::copy(&mut src, writer)?;
    Ok(())
}

/// Converts a file time to a ZIP timestamp, `None` outside 1980..=2107.
fn zip_date_time(time: SystemTime) -> Option<zip::DateTime> {
    let local: DateTime<Local> = time.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}
