use crate::backup::archive::{ArchiveEntry, ArchiveEntryIterable};
use crate::backup::function_path;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};

use bon::Builder;
use dyn_iter::{DynIter, IntoDynIterator};
use function_name::named;
use getset::Getters;
use itertools::Itertools;
use walkdir::{DirEntry, WalkDir};

use std::path::{Path, PathBuf};

/// Recursively walks a source directory and includes every regular file.
///
/// Members are stored as `<archive_root>/<path relative to src_dir>`, so two
/// roots with identically named files never collide and the folder name is
/// kept on extraction. Walk order is sorted by file name at every level.
/// Entries the walk cannot read are logged and skipped.
#[derive(Clone, Debug, Builder, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct DirectorySource {
    #[builder(into)]
    src_dir: PathBuf,
    #[builder(into)]
    archive_root: Option<String>,
}

impl DirectorySource {
    pub fn new<P: Into<PathBuf>>(src_dir: P) -> Self {
        let src_dir = src_dir.into();
        let archive_root = root_name(&src_dir);
        Self {
            src_dir,
            archive_root,
        }
    }
}

/// Base name of a directory, looking at the canonical path for `.`/`..`.
pub fn root_name<P: AsRef<Path>>(dir: P) -> Option<String> {
    let dir = dir.as_ref();
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            std::fs::canonicalize(dir)
                .ok()?
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
}

impl ArchiveEntryIterable for DirectorySource {
    #[named]
    fn archive_entry_iterator<'a>(&self) -> Result<DynIter<'a, Result<ArchiveEntry>>> {
        if !self.src_dir.is_dir() {
            return Err(Error::SourceUnreadable {
                path: self.src_dir.clone(),
            });
        }

        tracing::info!(
            "Starting directory scan: {:?} as {:?}",
            self.src_dir,
            self.archive_root.as_deref().unwrap_or("")
        );

        let src_dir = self.src_dir.clone();
        let archive_root = self.archive_root.clone();
        let source = self.clone();

        let entries = WalkDir::new(&self.src_dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |res| match res {
                Ok(de) => process_dir_entry(de, &src_dir, archive_root.as_deref()),
                // unreadable subtrees are left out, the rest of the walk goes on
                Err(e) => {
                    tracing::warn!("{}. Skipping...", e);
                    None
                }
            })
            .map(move |res| {
                res.map_err(|e| e.with_debug_object_and_fn_name(source.clone(), function_path!()))
            });

        Ok(entries.into_dyn_iter())
    }
}

fn process_dir_entry<P: AsRef<Path>>(
    de: DirEntry,
    base_src_dir: P,
    archive_root: Option<&str>,
) -> Option<Result<ArchiveEntry>> {
    let p = de.into_path();
    // follows symlinks: links to files are included, links to dirs are not walked
    if !p.is_file() {
        tracing::trace!("Skipping {:?} not a file", p);
        return None;
    }

    let res = match p.strip_prefix(base_src_dir.as_ref()) {
        Ok(stripped_path) => Ok(archive_name(archive_root, stripped_path)),
        Err(e) => Err(Error::from(e).with_msg(format!(
            "Stripping {:?} from {:?} failed",
            base_src_dir.as_ref(),
            p
        ))),
    };

    Some(res.map(|dst| {
        let entry = ArchiveEntry::new(p, dst);
        tracing::trace!("Including file: {:?} -> {:?}", entry.src, entry.dst);
        entry
    }))
}

fn archive_name(archive_root: Option<&str>, relative: &Path) -> String {
    archive_root
        .map(str::to_string)
        .into_iter()
        .chain(
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        )
        .join("/")
}
