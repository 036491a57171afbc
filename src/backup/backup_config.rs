use crate::backup::ini::parse_ini;
use crate::backup::result_error::error::{Error, ErrorKind};
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{Categorize, WithMsg};
use crate::backup::source::{normalize_path, resolve_sources, split_path_list, SourceEntry};
use crate::backup::task::ArchiveTask;
use crate::backup::validate::{ensure_dir_exist_or_created, validate_non_blank_path};
use crate::backup::zip::ZipConfig;

use bon::Builder;
use chrono::{DateTime, TimeZone};
use derive_more::From;
use getset::Getters;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Whole configuration of one backup run
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Builder, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct BackupConfig {
    source: SourceConfig,
    #[validate(nested)]
    destination: DestinationConfig,
    #[serde(default)]
    #[validate(nested)]
    #[builder(default)]
    archive: ZipConfig,
}

/// `[source]` section
#[derive(Clone, Serialize, Deserialize, Debug, Builder, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct SourceConfig {
    #[builder(into)]
    paths: PathList,
}

/// Source paths as one comma-separated string or, in YAML, as a list
#[derive(Clone, Serialize, Deserialize, Debug, From, PartialEq, Eq)]
#[serde(untagged)]
pub enum PathList {
    Joined(String),
    List(Vec<String>),
}

impl From<&str> for PathList {
    fn from(value: &str) -> Self {
        PathList::Joined(value.to_string())
    }
}

impl PathList {
    /// Trimmed, non-empty items in order of appearance
    pub fn items(&self) -> Vec<&str> {
        match self {
            PathList::Joined(joined) => split_path_list(joined).collect(),
            PathList::List(list) => list
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}

/// `[destination]` section
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Builder, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct DestinationConfig {
    #[validate(custom(function = validate_non_blank_path))]
    #[builder(into)]
    path: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Ini,
    Yaml,
}

impl ConfigFormat {
    /// YAML for `.yml`/`.yaml`, INI for everything else
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yml") | Some("yaml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Ini,
        }
    }
}

impl BackupConfig {
    /// Reads, parses and validates a configuration file.
    ///
    /// Every failure is a configuration error, and nothing on disk is
    /// touched.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = std::fs::read_to_string(path)
            .map_err(Error::from)
            .with_msg(format!("Cannot read configuration file {:?}", path))
            .and_then(|text| {
                Self::from_text(&text, ConfigFormat::from_path(path))
                    .with_msg(format!("Invalid configuration file {:?}", path))
            })
            .into_configuration()?;

        tracing::info!("Loaded configuration {:?}", path);
        Ok(config)
    }

    pub fn parse(text: &str, format: ConfigFormat) -> Result<Self> {
        Self::from_text(text, format).into_configuration()
    }

    fn from_text(text: &str, format: ConfigFormat) -> Result<Self> {
        let config: BackupConfig = match format {
            ConfigFormat::Yaml => serde_yml::from_str(text)?,
            ConfigFormat::Ini => serde_json::from_value(parse_ini(text)?)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configured sources, normalized and tagged in order of appearance
    pub fn resolve_sources(&self) -> Vec<SourceEntry> {
        resolve_sources(self.source.paths.items())
    }

    pub fn destination_dir(&self) -> PathBuf {
        normalize_path(self.destination.path.trim())
    }

    pub fn archive_task<O: Display, T: TimeZone<Offset = O>>(
        &self,
        dt: DateTime<T>,
    ) -> ArchiveTask {
        ArchiveTask::new(
            self.resolve_sources(),
            self.destination_dir(),
            &self.archive,
            dt,
        )
    }

    /// Resolves sources, prepares the destination and writes one archive
    /// named after `dt`. Returns the archive path.
    pub fn run_once<O: Display, T: TimeZone<Offset = O>>(
        &self,
        dt: DateTime<T>,
    ) -> Result<PathBuf> {
        let task = self.archive_task(dt);
        for source in task.sources() {
            tracing::debug!("Source entry: {}", source);
        }

        ensure_dir_exist_or_created(task.destination())
            .and_then(|_| task.run(&self.archive))
            .map_err(|e| match e.kind() {
                ErrorKind::Unexpected => Error::unexpected(e),
                _ => e,
            })
    }
}
