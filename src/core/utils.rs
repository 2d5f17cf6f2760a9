//! Small path helpers shared by the directory façade and its platform adapter.

use std::path::{Component, Path, PathBuf};

/// Lexically normalizes `path`: drops `.`, resolves `..` against the already
/// collected prefix and removes trailing separators. The filesystem is never
/// consulted, so symlinks are not resolved.
///
/// `..` never climbs above the root (or above the start of a relative path).
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(parent) = result.parent() {
                    result = parent.to_path_buf();
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// Returns true for the `.` and `..` pseudo entries.
pub fn is_dot_or_dotdot(name: &std::ffi::OsStr) -> bool {
    name == "." || name == ".."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize("/a/b/c/"), PathBuf::from("/a/b/c"));
        assert_eq!(normalize("/a/b/./c"), PathBuf::from("/a/b/c"));
        assert_eq!(normalize("/a/b/../c"), PathBuf::from("/a/c"));
        assert_eq!(normalize("/"), PathBuf::from("/"));
        assert_eq!(normalize("/.."), PathBuf::from("/"));
        assert_eq!(normalize(".."), PathBuf::from(""));
        assert_eq!(normalize(""), PathBuf::from(""));
        assert_eq!(normalize("../a"), PathBuf::from("a"));
        assert_eq!(normalize("./a"), PathBuf::from("a"));
    }

    #[test]
    fn test_is_dot_or_dotdot() {
        assert!(is_dot_or_dotdot(std::ffi::OsStr::new(".")));
        assert!(is_dot_or_dotdot(std::ffi::OsStr::new("..")));
        assert!(!is_dot_or_dotdot(std::ffi::OsStr::new("...")));
        assert!(!is_dot_or_dotdot(std::ffi::OsStr::new(".hidden")));
    }
}
