//! The single seam between the portable directory façade and the host OS.
//!
//! [`Platform`] lists the primitive operations the façade is built from. [`HostPlatform`]
//! is the implementation for the build target; it is the only place where `cfg` selects
//! OS-specific code.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::UnixPlatform as HostPlatform;
#[cfg(windows)]
pub use windows::WindowsPlatform as HostPlatform;

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::Result;
use crate::dir::{Entry, EntryType};

/// Primitive filesystem operations with uniform signatures.
///
/// Every failure is reported as `Err`. Entries returned by [`readdir`](Platform::readdir)
/// carry `lstat` metadata and never name `.` or `..`.
pub trait Platform {
    /// Open directory stream.
    type Handle;

    /// Metadata of `path`, following symlinks.
    fn stat(&self, path: &Path) -> Result<Entry>;
    /// Metadata of `path` itself.
    fn lstat(&self, path: &Path) -> Result<Entry>;

    fn opendir(&self, path: &Path) -> Result<Self::Handle>;
    /// Next entry of the stream, `None` once exhausted.
    fn readdir(&self, handle: &mut Self::Handle) -> Result<Option<Entry>>;
    fn closedir(&self, handle: Self::Handle) -> Result<()>;

    /// Creates a single directory; the parent must exist. `mode` is ignored where the
    /// platform has no permission bits.
    fn mkdir(&self, path: &Path, mode: u32) -> Result<()>;
    /// Removes an empty directory.
    fn rmdir(&self, path: &Path) -> Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    /// Removes a file or a symlink.
    fn unlink(&self, path: &Path) -> Result<()>;
    fn chmod(&self, path: &Path, mode: u32) -> Result<()>;
    fn symlink(&self, target: &Path, link: &Path) -> Result<()>;
    fn readlink(&self, link: &Path) -> Result<PathBuf>;
    /// Hard link.
    fn link(&self, target: &Path, link: &Path) -> Result<()>;
    /// Copies file content and permissions, returning the number of bytes copied.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64>;

    fn getcwd(&self) -> Result<PathBuf>;
    fn realpath(&self, path: &Path) -> Result<PathBuf>;
    fn temp_dir(&self) -> PathBuf;
}

/// Seconds since the epoch, 0 when unavailable or before 1970.
pub(crate) fn epoch_secs(time: std::io::Result<SystemTime>) -> u64 {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs())
}

/// The portable part of the metadata conversion; the OS modules fill in the rest.
pub(crate) fn base_entry(path: &Path, meta: &Metadata) -> Entry {
    let file_type = meta.file_type();
    let entry_type = if file_type.is_symlink() {
        EntryType::Symlink
    } else if file_type.is_dir() {
        EntryType::Directory
    } else if file_type.is_file() {
        EntryType::File
    } else {
        EntryType::Other
    };

    let mut entry = Entry::new(path, entry_type);
    entry.size = meta.len();
    entry.allocated_size = meta.len();
    entry.modified = epoch_secs(meta.modified());
    entry.accessed = epoch_secs(meta.accessed());
    entry.created = epoch_secs(meta.created());
    entry.changed = entry.modified;
    entry.flags.readonly = meta.permissions().readonly();
    entry
}

/// Reads the next entry of a host directory stream, skipping `.` and `..`.
pub(crate) fn next_host_entry<F>(handle: &mut std::fs::ReadDir, convert: F) -> Result<Option<Entry>>
where
    F: Fn(&Path, &Metadata) -> Entry,
{
    for dir_entry in handle.by_ref() {
        let dir_entry = dir_entry?;
        if crate::core::utils::is_dot_or_dotdot(&dir_entry.file_name()) {
            continue;
        }
        let path = dir_entry.path();
        let meta = std::fs::symlink_metadata(&path)?;
        return Ok(Some(convert(&path, &meta)));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn setup_test_env() -> TempDir {
        TempDir::new("platform_test").unwrap()
    }

    #[test]
    fn test_stat_file_and_dir() -> Result<()> {
        let temp_dir = setup_test_env();
        let platform = HostPlatform::default();
        let file = temp_dir.path().join("a.txt");
        std::fs::write(&file, b"12345")?;

        let entry = platform.stat(&file)?;
        assert_eq!(entry.name, "a.txt");
        assert_eq!(entry.entry_type, EntryType::File);
        assert_eq!(entry.size, 5);
        assert!(entry.modified > 0);

        let entry = platform.stat(temp_dir.path())?;
        assert!(entry.is_dir());
        Ok(())
    }

    #[test]
    fn test_stat_missing() {
        let temp_dir = setup_test_env();
        let platform = HostPlatform::default();
        assert!(platform.stat(&temp_dir.path().join("missing")).is_err());
        assert!(platform.lstat(&temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_readdir_yields_children_once() -> Result<()> {
        let temp_dir = setup_test_env();
        let platform = HostPlatform::default();
        std::fs::write(temp_dir.path().join("f"), b"")?;
        std::fs::create_dir(temp_dir.path().join("d"))?;

        let mut handle = platform.opendir(temp_dir.path())?;
        let mut names = Vec::new();
        while let Some(entry) = platform.readdir(&mut handle)? {
            names.push(entry.name);
        }
        platform.closedir(handle)?;

        names.sort();
        assert_eq!(names, vec!["d", "f"]);
        Ok(())
    }

    #[test]
    fn test_mkdir_rmdir_rename_unlink() -> Result<()> {
        let temp_dir = setup_test_env();
        let platform = HostPlatform::default();
        let dir = temp_dir.path().join("d");
        let moved = temp_dir.path().join("e");

        platform.mkdir(&dir, 0o755)?;
        assert!(platform.mkdir(&dir, 0o755).is_err());
        platform.rename(&dir, &moved)?;
        assert!(!dir.exists());

        let file = moved.join("f");
        std::fs::write(&file, b"x")?;
        assert!(platform.rmdir(&moved).is_err());
        platform.unlink(&file)?;
        platform.rmdir(&moved)?;
        assert!(!moved.exists());
        Ok(())
    }

    #[test]
    fn test_links_and_copy() -> Result<()> {
        let temp_dir = setup_test_env();
        let platform = HostPlatform::default();
        let file = temp_dir.path().join("f");
        std::fs::write(&file, b"data")?;

        let hard = temp_dir.path().join("hard");
        platform.link(&file, &hard)?;
        assert_eq!(std::fs::read(&hard)?, b"data");

        let copy = temp_dir.path().join("copy");
        assert_eq!(platform.copy_file(&file, &copy)?, 4);
        assert_eq!(std::fs::read(&copy)?, b"data");
        Ok(())
    }

    #[test]
    fn test_paths() -> Result<()> {
        let temp_dir = setup_test_env();
        let platform = HostPlatform::default();
        assert!(platform.getcwd()?.is_absolute());
        assert!(platform.realpath(temp_dir.path())?.is_absolute());
        assert!(!platform.temp_dir().as_os_str().is_empty());
        Ok(())
    }

    #[test]
    fn test_epoch_secs() {
        assert_eq!(epoch_secs(Ok(UNIX_EPOCH)), 0);
        assert_eq!(
            epoch_secs(Ok(UNIX_EPOCH + std::time::Duration::from_secs(42))),
            42
        );
        assert_eq!(epoch_secs(Err(std::io::Error::other("no time"))), 0);
    }
}
