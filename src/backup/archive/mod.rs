pub mod walkdir_source;

use crate::backup::archive::walkdir_source::DirectorySource;
use crate::backup::function_path;
use crate::backup::result_error::error::{Error, ErrorKind};
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithDebugObjectAndFnName;
use crate::backup::source::SourceEntry;

use dyn_iter::{DynIter, IntoDynIterator};
use function_name::named;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Represents a single file to be written into the backup archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Source file path on the filesystem
    pub src: Arc<Path>,

    /// Name of the member inside the archive
    ///
    /// Always `/`-separated, independent of the host platform.
    pub dst: Arc<str>,
}

impl ArchiveEntry {
    pub fn new<A: Into<Arc<Path>>, B: Into<Arc<str>>>(src: A, dst: B) -> ArchiveEntry {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }
}

/// Trait for generating archive entries from a configured source
///
/// The outer `Result` reports a source that cannot be used at all; the
/// iterator yields `Err` for failures hit while enumerating a usable source.
pub trait ArchiveEntryIterable {
    fn archive_entry_iterator<'a>(&self) -> Result<DynIter<'a, Result<ArchiveEntry>>>;
}

fn unreadable(path: &Path) -> Error {
    Error::SourceUnreadable {
        path: path.to_path_buf(),
    }
}

impl ArchiveEntryIterable for SourceEntry {
    #[named]
    fn archive_entry_iterator<'a>(&self) -> Result<DynIter<'a, Result<ArchiveEntry>>> {
        let path = self.path();
        // follows symlinks, so a broken link fails here
        let Ok(metadata) = std::fs::metadata(path) else {
            return Err(unreadable(path));
        };

        match self {
            _ if metadata.is_dir() => DirectorySource::new(path)
                .archive_entry_iterator()
                .with_debug_object_and_fn_name(self.clone(), function_path!()),
            SourceEntry::File(p) if metadata.is_file() => {
                let Some(name) = p.file_name() else {
                    return Err(unreadable(path));
                };
                let entry = ArchiveEntry::new(p.as_path(), name.to_string_lossy().into_owned());
                tracing::trace!("Including file: {:?} -> {:?}", entry.src, entry.dst);
                Ok(std::iter::once(Ok(entry)).into_dyn_iter())
            }
            _ => Err(unreadable(path)),
        }
    }
}

/// Enumerates every source in order and returns the archive members to write.
///
/// Unusable sources are skipped with a warning. When several members share
/// an archive name, the last one processed wins.
pub fn plan_entries(sources: &[SourceEntry]) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    for source in sources {
        let iter = match source.archive_entry_iterator() {
            Ok(iter) => iter,
            Err(e) if e.kind() == ErrorKind::SourceUnreadable => {
                tracing::warn!("{e}. Skipping...");
                continue;
            }
            Err(e) => return Err(e),
        };

        let before = entries.len();
        for entry in iter {
            entries.push(entry?);
        }
        tracing::debug!("{} files found under {}", entries.len() - before, source);
    }

    Ok(drop_shadowed(entries))
}

fn drop_shadowed(entries: Vec<ArchiveEntry>) -> Vec<ArchiveEntry> {
    let mut kept: HashMap<Arc<str>, Arc<Path>> = HashMap::new();
    let mut planned: Vec<_> = entries
        .into_iter()
        .rev()
        .filter(|entry| match kept.get(&entry.dst) {
            Some(winner) => {
                tracing::warn!(
                    "Archive name {:?} is used by {:?} and {:?}, keeping the last one",
                    entry.dst,
                    entry.src,
                    winner
                );
                false
            }
            None => {
                kept.insert(entry.dst.clone(), entry.src.clone());
                true
            }
        })
        .collect();
    planned.reverse();
    planned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::source::resolve_sources;
    use tempfile::TempDir;

    fn names(entries: &[ArchiveEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.dst.as_ref()).collect()
    }

    #[test]
    fn test_archive_entry_creation() {
        let entry = ArchiveEntry::new(Path::new("/source/file.txt"), "file.txt");
        assert_eq!(entry.src.as_ref(), Path::new("/source/file.txt"));
        assert_eq!(entry.dst.as_ref(), "file.txt");
    }

    #[test]
    fn test_file_source_uses_base_name() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("nested/readme.txt");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, "readme").unwrap();

        let entries: Vec<_> = SourceEntry::File(file.clone())
            .archive_entry_iterator()
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(entries, vec![ArchiveEntry::new(file, "readme.txt")]);
    }

    #[test]
    fn test_missing_source_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let missing = SourceEntry::File(temp_dir.path().join("missing"));

        let err = missing.archive_entry_iterator().err().unwrap();
        assert_eq!(err.kind(), ErrorKind::SourceUnreadable);
    }

    #[test]
    fn test_directory_turned_file_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("was_dir");
        std::fs::write(&path, "now a file").unwrap();

        let err = SourceEntry::Directory(path)
            .archive_entry_iterator()
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::SourceUnreadable);
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        let link = temp_dir.path().join("dangling");
        std::os::unix::fs::symlink(temp_dir.path().join("nowhere"), &link).unwrap();

        let err = SourceEntry::File(link)
            .archive_entry_iterator()
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::SourceUnreadable);
    }

    #[test]
    fn test_plan_mixed_sources() {
        let temp_dir = TempDir::new().unwrap();
        let docs = temp_dir.path().join("docs");
        std::fs::create_dir_all(docs.join("sub")).unwrap();
        std::fs::write(docs.join("a.txt"), "a").unwrap();
        std::fs::write(docs.join("sub/b.txt"), "b").unwrap();
        let readme = temp_dir.path().join("readme.txt");
        std::fs::write(&readme, "readme").unwrap();

        let sources = resolve_sources([
            docs.display().to_string(),
            temp_dir.path().join("missing").display().to_string(),
            readme.display().to_string(),
        ]);
        let entries = plan_entries(&sources).unwrap();

        assert_eq!(
            names(&entries),
            vec!["docs/a.txt", "docs/sub/b.txt", "readme.txt"]
        );
    }

    #[test]
    fn test_plan_only_invalid_sources_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let sources = resolve_sources([
            temp_dir.path().join("nope").display().to_string(),
            temp_dir.path().join("nada/").display().to_string(),
        ]);

        assert!(plan_entries(&sources).unwrap().is_empty());
        assert!(plan_entries(&[]).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_plan_survives_unreadable_subdirectory() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let docs = temp_dir.path().join("docs");
        let locked = docs.join("locked");
        std::fs::create_dir_all(&locked).unwrap();
        std::fs::write(docs.join("a.txt"), "a").unwrap();
        std::fs::write(locked.join("secret.txt"), "s").unwrap();
        let other = temp_dir.path().join("other.txt");
        std::fs::write(&other, "other").unwrap();
        std::fs::set_permissions(&locked, PermissionsExt::from_mode(0o000)).unwrap();

        let planned = plan_entries(&[
            SourceEntry::Directory(docs),
            SourceEntry::File(other),
        ]);
        std::fs::set_permissions(&locked, PermissionsExt::from_mode(0o755)).unwrap();

        let entries = planned.unwrap();
        let names: Vec<_> = names(&entries)
            .into_iter()
            .filter(|n| *n != "docs/locked/secret.txt")
            .collect();
        assert_eq!(names, vec!["docs/a.txt", "other.txt"]);
    }

    #[test]
    fn test_plan_same_base_name_last_wins() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("one/notes.txt");
        let second = temp_dir.path().join("two/notes.txt");
        for f in [&first, &second] {
            std::fs::create_dir_all(f.parent().unwrap()).unwrap();
            std::fs::write(f, f.display().to_string()).unwrap();
        }
        let other = temp_dir.path().join("other.txt");
        std::fs::write(&other, "other").unwrap();

        let sources = vec![
            SourceEntry::File(first),
            SourceEntry::File(other.clone()),
            SourceEntry::File(second.clone()),
        ];
        let entries = plan_entries(&sources).unwrap();

        assert_eq!(
            entries,
            vec![
                ArchiveEntry::new(other, "other.txt"),
                ArchiveEntry::new(second, "notes.txt"),
            ]
        );
    }
}
