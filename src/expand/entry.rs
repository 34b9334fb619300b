// src/expand/entry.rs

//! Filesystem lookups for tree expansion

use std::fs;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};

use walkdir::WalkDir;

/// What a path refers to at the moment it is expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEntry {
    File,
    Directory,
    /// Nonexistent, dangling, or neither a regular file nor a directory
    Missing,
}

impl FsEntry {
    /// Classify `path`, following symlinks
    ///
    /// Always queries the filesystem; nothing is cached between calls.
    pub fn classify(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Self::File,
            Ok(meta) if meta.is_dir() => Self::Directory,
            _ => Self::Missing,
        }
    }
}

/// Immediate children of `dir`, in the order the filesystem returns them
pub fn children(dir: &Path) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> {
    WalkDir::new(dir).min_depth(1).max_depth(1).into_iter()
}

/// Split a `base` or `from` value into its path segments
///
/// Backslash is the documented separator; forward slash is accepted too.
/// Empty segments (leading, trailing or doubled separators) are dropped.
pub fn segments(path: &str) -> Vec<&str> {
    path.split(['\\', '/']).filter(|s| !s.is_empty()).collect()
}

/// Turn a `from` value into a filesystem path
///
/// Relative values are resolved under `source_root`.
pub fn resolve_source(source_root: &Path, from: &str) -> PathBuf {
    let native = from.replace(['\\', '/'], MAIN_SEPARATOR_STR);
    let path = Path::new(&native);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        source_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_classify() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        assert_eq!(FsEntry::classify(dir.path()), FsEntry::Directory);
        assert_eq!(FsEntry::classify(&file), FsEntry::File);
        assert_eq!(FsEntry::classify(&dir.path().join("nope")), FsEntry::Missing);
    }

    #[test]
    fn test_classify_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("late.txt");
        assert_eq!(FsEntry::classify(&file), FsEntry::Missing);
        fs::write(&file, "now").unwrap();
        assert_eq!(FsEntry::classify(&file), FsEntry::File);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_missing() {
        let dir = TempDir::new().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink(dir.path().join("target"), &link).unwrap();
        assert_eq!(FsEntry::classify(&link), FsEntry::Missing);
    }

    #[test]
    fn test_children_skips_self_and_grandchildren() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("deep.txt"), "").unwrap();
        fs::write(dir.path().join("top.txt"), "").unwrap();

        let mut names: Vec<String> = children(dir.path())
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["sub", "top.txt"]);
    }

    #[test]
    fn test_segments() {
        assert_eq!(segments("INSTALLDIR\\bin"), ["INSTALLDIR", "bin"]);
        assert_eq!(segments("\\a\\\\b\\"), ["a", "b"]);
        assert_eq!(segments("dist/tools"), ["dist", "tools"]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_resolve_source() {
        let root = Path::new("/work/setup");
        assert_eq!(
            resolve_source(root, "dist\\bin"),
            root.join("dist").join("bin")
        );
        #[cfg(unix)]
        assert_eq!(resolve_source(root, "/opt/app"), PathBuf::from("/opt/app"));
    }
}
