use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// One configured path to back up.
///
/// The variant is decided once, when the configuration is resolved: a path
/// that is an existing directory at that moment becomes `Directory`,
/// anything else (including paths that do not exist) becomes `File`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceEntry {
    Directory(PathBuf),
    File(PathBuf),
}

impl SourceEntry {
    /// Trims and normalizes `raw`, then tags it by probing the filesystem.
    pub fn resolve<S: AsRef<str>>(raw: S) -> Self {
        let path = normalize_path(raw.as_ref().trim());
        if path.is_dir() {
            SourceEntry::Directory(path)
        } else {
            SourceEntry::File(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            SourceEntry::Directory(p) | SourceEntry::File(p) => p,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, SourceEntry::Directory(_))
    }
}

impl Display for SourceEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceEntry::Directory(p)
                if !p.as_os_str().to_string_lossy().ends_with(MAIN_SEPARATOR) =>
            {
                write!(f, "{}{}", p.display(), MAIN_SEPARATOR)
            }
            _ => write!(f, "{}", self.path().display()),
        }
    }
}

/// Splits a comma-separated path list, trimming items and dropping empty ones.
pub fn split_path_list(paths: &str) -> impl Iterator<Item = &str> {
    paths.split(',').map(str::trim).filter(|p| !p.is_empty())
}

/// Resolves raw path strings into source entries, keeping their order.
pub fn resolve_sources<I, S>(raw_paths: I) -> Vec<SourceEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw_paths
        .into_iter()
        .filter(|p| !p.as_ref().trim().is_empty())
        .map(SourceEntry::resolve)
        .collect()
}

/// Lexically normalizes a path without touching the filesystem.
///
/// Repeated separators and `.` segments disappear, `dir/..` pairs collapse,
/// `..` directly under the root is dropped and an empty result becomes `.`.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            c => out.push(c),
        }
    }

    if out.is_empty() {
        PathBuf::from(".")
    } else {
        out.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("a//b/./c"), PathBuf::from("a/b/c"));
        assert_eq!(normalize_path("./docs/"), PathBuf::from("docs"));
        assert_eq!(normalize_path("a/b/../c"), PathBuf::from("a/c"));
        assert_eq!(normalize_path("../a"), PathBuf::from("../a"));
        assert_eq!(normalize_path("a/../.."), PathBuf::from(".."));
        assert_eq!(normalize_path("a/.."), PathBuf::from("."));
        assert_eq!(normalize_path(""), PathBuf::from("."));
        assert_eq!(normalize_path("/../etc"), PathBuf::from("/etc"));
    }

    #[test]
    fn test_split_path_list() {
        let items: Vec<_> = split_path_list(" ./docs , ./readme.txt,, ").collect();
        assert_eq!(items, vec!["./docs", "./readme.txt"]);
        assert_eq!(split_path_list("   ").count(), 0);
    }

    #[test]
    fn test_resolve_tags_directories_and_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("docs");
        let file = temp_dir.path().join("readme.txt");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(&file, "hi").unwrap();
        let missing = temp_dir.path().join("missing");

        let sources = resolve_sources([
            format!(" {}/ ", dir.display()),
            file.display().to_string(),
            missing.display().to_string(),
        ]);

        assert_eq!(
            sources,
            vec![
                SourceEntry::Directory(dir.clone()),
                SourceEntry::File(file),
                SourceEntry::File(missing),
            ]
        );
        assert!(sources[0].is_directory());
        assert_eq!(sources[0].to_string(), format!("{}/", dir.display()));
        assert!(!sources[1].to_string().ends_with('/'));
    }

    #[test]
    fn test_resolve_drops_blank_items() {
        assert!(resolve_sources(["", "  "]).is_empty());
    }
}
