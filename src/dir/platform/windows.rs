use std::fs::{self, Metadata, ReadDir};
use std::os::windows::fs::MetadataExt;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{Platform, base_entry, next_host_entry};
use crate::core::Result;
use crate::dir::{Entry, EntryType};

const FILE_ATTRIBUTE_READONLY: u32 = 0x1;
const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;

const MODE_READONLY: u32 = 0o444;
const MODE_WRITABLE: u32 = 0o666;

const EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "bat", "cmd", "com", "ps1"];

/// Windows implementation on top of `std::fs`. Permission bits are emulated from the
/// read-only attribute.
#[derive(Debug, Copy, Clone, Default)]
pub struct WindowsPlatform;

fn to_entry(path: &Path, meta: &Metadata) -> Entry {
    let mut entry = base_entry(path, meta);
    let attributes = meta.file_attributes();

    entry.flags.readonly = attributes & FILE_ATTRIBUTE_READONLY != 0;
    entry.flags.hidden = attributes & FILE_ATTRIBUTE_HIDDEN != 0;
    entry.flags.system = attributes & FILE_ATTRIBUTE_SYSTEM != 0;
    entry.permissions = if entry.flags.readonly {
        MODE_READONLY
    } else {
        MODE_WRITABLE
    };
    entry.flags.executable = entry.entry_type == EntryType::File
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                EXECUTABLE_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            });
    entry
}

/// Drops the `\\?\` verbatim prefix `canonicalize` adds to local paths.
fn strip_verbatim(path: PathBuf) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_prefix(r"\\?\")) {
        Some(rest) if !rest.starts_with("UNC\\") => PathBuf::from(rest),
        _ => path,
    }
}

impl Platform for WindowsPlatform {
    type Handle = ReadDir;

    fn stat(&self, path: &Path) -> Result<Entry> {
        let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
        Ok(to_entry(path, &meta))
    }

    fn lstat(&self, path: &Path) -> Result<Entry> {
        let meta =
            fs::symlink_metadata(path).with_context(|| format!("lstat {}", path.display()))?;
        Ok(to_entry(path, &meta))
    }

    fn opendir(&self, path: &Path) -> Result<ReadDir> {
        fs::read_dir(path).with_context(|| format!("opendir {}", path.display()))
    }

    fn readdir(&self, handle: &mut ReadDir) -> Result<Option<Entry>> {
        next_host_entry(handle, to_entry)
    }

    fn closedir(&self, handle: ReadDir) -> Result<()> {
        drop(handle);
        Ok(())
    }

    fn mkdir(&self, path: &Path, _mode: u32) -> Result<()> {
        fs::create_dir(path).with_context(|| format!("mkdir {}", path.display()))
    }

    fn rmdir(&self, path: &Path) -> Result<()> {
        fs::remove_dir(path).with_context(|| format!("rmdir {}", path.display()))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to)
            .with_context(|| format!("rename {} -> {}", from.display(), to.display()))
    }

    fn unlink(&self, path: &Path) -> Result<()> {
        // directory symlinks are removed like directories
        let is_dir_link = fs::symlink_metadata(path)
            .map(|meta| meta.file_type().is_symlink() && fs::metadata(path).is_ok_and(|m| m.is_dir()))
            .unwrap_or(false);
        let result = if is_dir_link {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        result.with_context(|| format!("unlink {}", path.display()))
    }

    /// Only the owner write bit is honoured: without it the file becomes read-only.
    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        let mut permissions = fs::metadata(path)
            .with_context(|| format!("chmod {}", path.display()))?
            .permissions();
        permissions.set_readonly(mode & 0o200 == 0);
        fs::set_permissions(path, permissions).with_context(|| format!("chmod {}", path.display()))
    }

    /// May require the symlink privilege or developer mode.
    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        let resolved = match link.parent() {
            Some(parent) if target.is_relative() => parent.join(target),
            _ => target.to_path_buf(),
        };
        let result = if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.with_context(|| format!("symlink {} -> {}", link.display(), target.display()))
    }

    fn readlink(&self, link: &Path) -> Result<PathBuf> {
        fs::read_link(link).with_context(|| format!("readlink {}", link.display()))
    }

    fn link(&self, target: &Path, link: &Path) -> Result<()> {
        fs::hard_link(target, link)
            .with_context(|| format!("link {} -> {}", link.display(), target.display()))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64> {
        fs::copy(from, to).with_context(|| format!("copy {} -> {}", from.display(), to.display()))
    }

    fn getcwd(&self) -> Result<PathBuf> {
        std::env::current_dir().context("getcwd")
    }

    fn realpath(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path)
            .map(strip_verbatim)
            .with_context(|| format!("realpath {}", path.display()))
    }

    /// `GetTempPath` through the standard library.
    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }
}
