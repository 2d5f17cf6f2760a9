//! Portable directory operations over the host filesystem.
//!
//! [`Directory`] is written purely against the [`Platform`] trait; the OS-specific code lives
//! in [`platform`] and is picked at build time through [`HostPlatform`].
//!
//! ### Key Features:
//! - **Queries**: existence and type checks, child counts, recursive sizes, metadata snapshots.
//! - **Tree operations**: create with parents, recursive remove, shallow and deep copy, move
//!   with a copy fallback, mirror and sync.
//! - **Iteration**: lazy [`DirIter`] with optional recursion, sorting and filtering;
//!   callback-driven [`scan`](Directory::scan) with early termination.
//! - **Temp directories**: uniquely named, owner-only children of the system temp directory.
//!
//! Symlinks are never followed by destructive operations: removing or copying a link acts
//! on the link itself.
//!
//! ### Example:
//! ```
//! use io_kit::dir::Directory;
//!
//! let dir = Directory::new();
//! let tmp = dir.create_temp().unwrap();
//! dir.create(tmp.join("a/b")).unwrap();
//! std::fs::write(tmp.join("a/b/note.txt"), b"hello").unwrap();
//!
//! assert!(dir.is_directory(tmp.join("a/b")));
//! assert_eq!(dir.size(&tmp).unwrap(), 5);
//!
//! dir.remove_recursive(&tmp).unwrap();
//! assert!(!dir.exists(&tmp));
//! ```

mod entry;
mod iter;
pub mod path;
pub mod platform;

pub use entry::{Entry, EntryFlags, EntryType};
pub use iter::{DirIter, IterOptions, SortMode};
pub use platform::{HostPlatform, Platform};

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tracing::{debug, trace, warn};

use crate::core::{Result, utils};

const DIR_MODE: u32 = 0o755;
const TEMP_MODE: u32 = 0o700;
const TEMP_PREFIX: &str = "io-kit";
const TEMP_ATTEMPTS: u32 = 1000;

/// Kind of the io error behind `err`, if there is one.
fn io_kind(err: &anyhow::Error) -> Option<io::ErrorKind> {
    err.downcast_ref::<io::Error>().map(io::Error::kind)
}

/// Destination of `entry` when it is copied into `dir`.
fn child_of(dir: &Path, entry: &Entry) -> PathBuf {
    match entry.path.file_name() {
        Some(name) => dir.join(name),
        None => dir.join(&entry.name),
    }
}

/// Directory façade bound to a platform adapter.
///
/// All paths may be relative (to the process working directory) or absolute. Failures are
/// returned as errors carrying the failing primitive and path; partially completed tree
/// operations are not rolled back.
#[derive(Debug, Default, Clone)]
pub struct Directory<P: Platform = HostPlatform> {
    platform: P,
}

impl Directory {
    /// Façade over the host filesystem.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: Platform> Directory<P> {
    pub fn with_platform(platform: P) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Checks whether `path` names anything, dangling symlinks included.
    pub fn exists<T: AsRef<Path>>(&self, path: T) -> bool {
        self.platform.lstat(path.as_ref()).is_ok()
    }

    /// Checks whether `path` is a directory or a symlink to one.
    pub fn is_directory<T: AsRef<Path>>(&self, path: T) -> bool {
        self.platform
            .stat(path.as_ref())
            .is_ok_and(|entry| entry.is_dir())
    }

    /// Checks whether `path` is a regular file or a symlink to one.
    pub fn is_file<T: AsRef<Path>>(&self, path: T) -> bool {
        self.platform
            .stat(path.as_ref())
            .is_ok_and(|entry| entry.is_file())
    }

    pub fn is_symlink<T: AsRef<Path>>(&self, path: T) -> bool {
        self.platform
            .lstat(path.as_ref())
            .is_ok_and(|entry| entry.is_symlink())
    }

    /// Returns true when the directory has no children.
    pub fn is_empty<T: AsRef<Path>>(&self, path: T) -> Result<bool> {
        let first = self.iter(path)?.next().transpose()?;
        Ok(first.is_none())
    }

    /// Number of direct children.
    pub fn count<T: AsRef<Path>>(&self, path: T) -> Result<usize> {
        let mut count = 0;
        for entry in self.iter(path)? {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Size of a file, or the sum of the sizes of all regular files below a directory.
    /// Symlinks are not followed and count as zero.
    pub fn size<T: AsRef<Path>>(&self, path: T) -> Result<u64> {
        let path = path.as_ref();
        let entry = self.platform.lstat(path)?;
        if !entry.is_dir() {
            return Ok(if entry.is_file() { entry.size } else { 0 });
        }

        let mut total = 0;
        for entry in self.iter_with(path, IterOptions::recursive())? {
            let entry = entry?;
            if entry.is_file() {
                total += entry.size;
            }
        }
        Ok(total)
    }

    /// Metadata snapshot of `path`, following symlinks.
    pub fn stat<T: AsRef<Path>>(&self, path: T) -> Result<Entry> {
        self.platform.stat(path.as_ref())
    }

    fn require_dir(&self, path: &Path) -> Result<()> {
        if self.platform.stat(path)?.is_dir() {
            Ok(())
        } else {
            Err(anyhow!("{} is not a directory", path.display()))
        }
    }

    /// Creates `path` and every missing parent. Succeeds when `path` is already a directory;
    /// fails when it exists as anything else.
    pub fn create<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(anyhow!("invalid path: empty"));
        }

        let mut missing = Vec::new();
        let mut current = Some(path);
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() {
                break;
            }
            match self.platform.stat(dir) {
                Ok(entry) if entry.is_dir() => break,
                Ok(_) => return Err(anyhow!("{} exists and is not a directory", dir.display())),
                Err(_) => missing.push(dir),
            }
            current = dir.parent();
        }

        for dir in missing.into_iter().rev() {
            debug!(path = %dir.display(), "creating directory");
            if let Err(err) = self.platform.mkdir(dir, DIR_MODE) {
                // someone else may have created it in between
                if !self.is_directory(dir) {
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Removes an empty directory.
    pub fn remove<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), "removing directory");
        self.platform.rmdir(path)
    }

    /// Removes `path` with everything below it. A missing `path` is not an error.
    pub fn remove_recursive<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        let entry = match self.platform.lstat(path) {
            Ok(entry) => entry,
            Err(err) if io_kind(&err) == Some(io::ErrorKind::NotFound) => return Ok(()),
            Err(err) => return Err(err),
        };
        debug!(path = %path.display(), "removing recursively");
        self.remove_entry(&entry)
    }

    fn remove_entry(&self, entry: &Entry) -> Result<()> {
        if entry.is_dir() {
            for child in self.children(&entry.path)? {
                self.remove_entry(&child)?;
            }
            self.platform.rmdir(&entry.path)
        } else {
            trace!(path = %entry.path.display(), "unlinking");
            self.platform.unlink(&entry.path)
        }
    }

    /// Removes every child of `path`, keeping `path` itself.
    pub fn clear<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        self.require_dir(path)?;
        debug!(path = %path.display(), "clearing directory");
        for child in self.children(path)? {
            self.remove_entry(&child)?;
        }
        Ok(())
    }

    /// Children of `path`, collected before the caller starts mutating the directory.
    fn children(&self, path: &Path) -> Result<Vec<Entry>> {
        self.iter(path)?.collect()
    }

    /// Copies the files of `src` into `dst`; subdirectories are created empty.
    pub fn copy<S: AsRef<Path>, D: AsRef<Path>>(&self, src: S, dst: D) -> Result<()> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        self.require_dir(src)?;
        debug!(from = %src.display(), to = %dst.display(), "shallow copy");

        self.create(dst)?;
        for child in self.children(src)? {
            let target = child_of(dst, &child);
            if child.is_dir() {
                self.unlink_symlink(&target)?;
                self.create(&target)?;
            } else {
                self.copy_entry(&child, &target)?;
            }
        }
        Ok(())
    }

    /// Deep copy of `src` to `dst`. Symlinks are recreated as symlinks. Stops at the first
    /// error without undoing what was already copied.
    pub fn copy_recursive<S: AsRef<Path>, D: AsRef<Path>>(&self, src: S, dst: D) -> Result<()> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        let entry = self.platform.lstat(src)?;
        if entry.is_dir() && self.is_within(dst, src)? {
            return Err(anyhow!(
                "cannot copy {} into itself ({})",
                src.display(),
                dst.display()
            ));
        }
        debug!(from = %src.display(), to = %dst.display(), "recursive copy");
        self.copy_entry(&entry, dst)
    }

    /// Lexical check whether `path` lies at or below `ancestor`.
    fn is_within(&self, path: &Path, ancestor: &Path) -> Result<bool> {
        let cwd = self.platform.getcwd()?;
        let path = utils::normalize(cwd.join(path));
        let ancestor = utils::normalize(cwd.join(ancestor));
        Ok(path.starts_with(ancestor))
    }

    /// Removes `target` when it is a symlink, so that writing to it cannot reach the
    /// link's target.
    fn unlink_symlink(&self, target: &Path) -> Result<()> {
        if self.platform.lstat(target).is_ok_and(|e| e.is_symlink()) {
            trace!(path = %target.display(), "replacing symlink");
            self.platform.unlink(target)?;
        }
        Ok(())
    }

    fn copy_entry(&self, entry: &Entry, target: &Path) -> Result<()> {
        trace!(from = %entry.path.display(), to = %target.display(), "copying entry");
        self.unlink_symlink(target)?;
        match entry.entry_type {
            EntryType::Directory => {
                self.create(target)?;
                for child in self.children(&entry.path)? {
                    self.copy_entry(&child, &child_of(target, &child))?;
                }
                Ok(())
            }
            EntryType::Symlink => {
                let link_target = self.platform.readlink(&entry.path)?;
                self.remove_recursive(target)?;
                self.platform.symlink(&link_target, target)
            }
            EntryType::File => self.platform.copy_file(&entry.path, target).map(|_| ()),
            other => {
                warn!(path = %entry.path.display(), "skipping {other:?} entry");
                Ok(())
            }
        }
    }

    /// Renames `src` to `dst`, falling back to copy-then-remove when a rename is not possible
    /// (for example across filesystems).
    pub fn move_to<S: AsRef<Path>, D: AsRef<Path>>(&self, src: S, dst: D) -> Result<()> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        match self.platform.rename(src, dst) {
            Ok(()) => {
                debug!(from = %src.display(), to = %dst.display(), "moved");
                Ok(())
            }
            Err(err) => {
                warn!(
                    from = %src.display(),
                    to = %dst.display(),
                    "rename failed, copying instead: {err:#}"
                );
                self.copy_recursive(src, dst)?;
                self.remove_recursive(src)
            }
        }
    }

    /// Single-step rename, no fallback.
    pub fn rename<S: AsRef<Path>, D: AsRef<Path>>(&self, old: S, new: D) -> Result<()> {
        let (old, new) = (old.as_ref(), new.as_ref());
        debug!(from = %old.display(), to = %new.display(), "renaming");
        self.platform.rename(old, new)
    }

    /// Deep copy of `path` next to itself, named `path` + `suffix`. Returns the copy's path.
    pub fn backup<T: AsRef<Path>>(&self, path: T, suffix: &str) -> Result<PathBuf> {
        let path = path.as_ref().components().as_path();
        if path.as_os_str().is_empty() {
            return Err(anyhow!("invalid path: empty"));
        }
        let mut name = path.as_os_str().to_os_string();
        name.push(suffix);
        let backup = PathBuf::from(name);

        self.copy_recursive(path, &backup)?;
        Ok(backup)
    }

    /// Replaces `dst` with a deep copy of `src`.
    pub fn mirror<S: AsRef<Path>, D: AsRef<Path>>(&self, src: S, dst: D) -> Result<()> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        self.require_dir(src)?;
        self.remove_recursive(dst)?;
        self.copy_recursive(src, dst)
    }

    /// Brings `dst` up to date with `src`, overwriting files. With `delete_extraneous`,
    /// entries of `dst` missing from `src` are removed in a second pass, once the whole
    /// tree was copied.
    pub fn sync<S: AsRef<Path>, D: AsRef<Path>>(
        &self,
        src: S,
        dst: D,
        delete_extraneous: bool,
    ) -> Result<()> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        self.require_dir(src)?;
        debug!(from = %src.display(), to = %dst.display(), "syncing");
        self.sync_tree(src, dst)?;
        if delete_extraneous {
            self.prune(src, dst)?;
        }
        Ok(())
    }

    fn sync_tree(&self, src: &Path, dst: &Path) -> Result<()> {
        self.create(dst)?;
        for child in self.children(src)? {
            let target = child_of(dst, &child);
            let existing = self.platform.lstat(&target).ok();
            if child.is_dir() {
                if existing.is_some_and(|e| !e.is_dir()) {
                    self.remove_recursive(&target)?;
                }
                self.sync_tree(&child.path, &target)?;
            } else {
                if existing.is_some_and(|e| e.is_dir()) {
                    self.remove_recursive(&target)?;
                }
                self.copy_entry(&child, &target)?;
            }
        }
        Ok(())
    }

    /// Removes everything below `dst` that has no counterpart below `src`.
    fn prune(&self, src: &Path, dst: &Path) -> Result<()> {
        let names: HashSet<OsString> = self
            .children(src)?
            .into_iter()
            .filter_map(|e| e.path.file_name().map(OsStr::to_os_string))
            .collect();

        for extra in self.children(dst)? {
            let Some(name) = extra.path.file_name() else {
                continue;
            };
            if !names.contains(name) {
                debug!(path = %extra.path.display(), "removing extraneous entry");
                self.remove_entry(&extra)?;
            } else if extra.is_dir() {
                self.prune(&src.join(name), &extra.path)?;
            }
        }
        Ok(())
    }

    /// Hard link to a regular file.
    pub fn link<T: AsRef<Path>, L: AsRef<Path>>(&self, target: T, link: L) -> Result<()> {
        let (target, link) = (target.as_ref(), link.as_ref());
        if !self.platform.stat(target)?.is_file() {
            return Err(anyhow!(
                "hard links are supported for files only: {}",
                target.display()
            ));
        }
        debug!(target = %target.display(), link = %link.display(), "hard link");
        self.platform.link(target, link)
    }

    /// Symbolic link at `link` pointing to `target`. On Windows this may need elevated
    /// privileges.
    pub fn symlink<T: AsRef<Path>, L: AsRef<Path>>(&self, target: T, link: L) -> Result<()> {
        let (target, link) = (target.as_ref(), link.as_ref());
        debug!(target = %target.display(), link = %link.display(), "symlink");
        self.platform.symlink(target, link)
    }

    /// Iterates the direct children of `path` in platform order.
    pub fn iter<T: AsRef<Path>>(&self, path: T) -> Result<DirIter<'_, P>> {
        self.iter_with(path, IterOptions::default())
    }

    pub fn iter_with<T: AsRef<Path>>(&self, path: T, options: IterOptions) -> Result<DirIter<'_, P>> {
        DirIter::open(&self.platform, path.as_ref(), options)
    }

    /// At most `max` direct children of `path`.
    pub fn list<T: AsRef<Path>>(&self, path: T, max: usize) -> Result<Vec<Entry>> {
        self.iter(path)?.take(max).collect()
    }

    /// Calls `callback` for each direct child until it returns false.
    pub fn scan<T, F>(&self, path: T, callback: F) -> Result<()>
    where
        T: AsRef<Path>,
        F: FnMut(&Entry) -> bool,
    {
        Self::drive(self.iter(path)?, callback)
    }

    /// Like [`scan`](Directory::scan) but depth-first over the whole tree; a directory is
    /// reported before its content.
    pub fn scan_recursive<T, F>(&self, path: T, callback: F) -> Result<()>
    where
        T: AsRef<Path>,
        F: FnMut(&Entry) -> bool,
    {
        Self::drive(self.iter_with(path, IterOptions::recursive())?, callback)
    }

    fn drive<F>(iter: DirIter<'_, P>, mut callback: F) -> Result<()>
    where
        F: FnMut(&Entry) -> bool,
    {
        for entry in iter {
            if !callback(&entry?) {
                break;
            }
        }
        Ok(())
    }

    /// The system temp directory.
    pub fn temp(&self) -> PathBuf {
        self.platform.temp_dir()
    }

    /// Creates a new owner-only directory inside [`temp`](Directory::temp) and returns its
    /// path. The caller owns the directory and removes it when done.
    pub fn create_temp(&self) -> Result<PathBuf> {
        let base = self.platform.temp_dir();
        let pid = std::process::id();

        for n in 0..TEMP_ATTEMPTS {
            let candidate = base.join(format!("{TEMP_PREFIX}-{pid}-{n}"));
            match self.platform.mkdir(&candidate, TEMP_MODE) {
                Ok(()) => {
                    debug!(path = %candidate.display(), "created temp directory");
                    return Ok(candidate);
                }
                Err(err) if io_kind(&err) == Some(io::ErrorKind::AlreadyExists) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(anyhow!(
            "no free temp directory name in {} after {TEMP_ATTEMPTS} attempts",
            base.display()
        ))
    }

    /// Canonical absolute form of `path`, symlinks resolved.
    pub fn realpath<T: AsRef<Path>>(&self, path: T) -> Result<PathBuf> {
        self.platform.realpath(path.as_ref())
    }

    pub fn cwd(&self) -> Result<PathBuf> {
        self.platform.getcwd()
    }

    /// Modification time in seconds since the epoch.
    pub fn get_modified<T: AsRef<Path>>(&self, path: T) -> Result<u64> {
        Ok(self.platform.stat(path.as_ref())?.modified)
    }

    /// Creation time in seconds since the epoch, 0 where the filesystem does not record it.
    pub fn get_created<T: AsRef<Path>>(&self, path: T) -> Result<u64> {
        Ok(self.platform.stat(path.as_ref())?.created)
    }

    pub fn get_permissions<T: AsRef<Path>>(&self, path: T) -> Result<u32> {
        Ok(self.platform.stat(path.as_ref())?.permissions)
    }

    pub fn set_permissions<T: AsRef<Path>>(&self, path: T, mode: u32) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), "chmod {mode:o}");
        self.platform.chmod(path, mode)
    }
}
