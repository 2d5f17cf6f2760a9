use std::fs::{self, DirBuilder, Metadata, ReadDir};
use std::os::unix::fs::{DirBuilderExt, FileTypeExt, MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{Platform, base_entry, next_host_entry};
use crate::core::Result;
use crate::dir::{Entry, EntryType};

const DEFAULT_TMP: &str = "/tmp";
const BLOCK_UNIT: u64 = 512;

/// POSIX implementation on top of `std::fs` and the Unix extension traits.
#[derive(Debug, Copy, Clone, Default)]
pub struct UnixPlatform;

fn to_entry(path: &Path, meta: &Metadata) -> Entry {
    let mut entry = base_entry(path, meta);
    let file_type = meta.file_type();
    if file_type.is_fifo() {
        entry.entry_type = EntryType::Fifo;
    } else if file_type.is_socket() {
        entry.entry_type = EntryType::Socket;
    } else if file_type.is_block_device() {
        entry.entry_type = EntryType::BlockDevice;
    } else if file_type.is_char_device() {
        entry.entry_type = EntryType::CharDevice;
    }

    entry.allocated_size = meta.blocks() * BLOCK_UNIT;
    entry.changed = u64::try_from(meta.ctime()).unwrap_or(0);
    entry.permissions = meta.mode() & 0o7777;
    entry.uid = meta.uid();
    entry.gid = meta.gid();
    entry.flags.hidden = entry.name.starts_with('.') && entry.name != "." && entry.name != "..";
    entry.flags.executable = entry.entry_type == EntryType::File && meta.mode() & 0o111 != 0;
    entry
}

impl Platform for UnixPlatform {
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

    fn mkdir(&self, path: &Path, mode: u32) -> Result<()> {
        DirBuilder::new()
            .mode(mode)
            .create(path)
            .with_context(|| format!("mkdir {}", path.display()))
    }

    fn rmdir(&self, path: &Path) -> Result<()> {
        fs::remove_dir(path).with_context(|| format!("rmdir {}", path.display()))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to)
            .with_context(|| format!("rename {} -> {}", from.display(), to.display()))
    }

    fn unlink(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("unlink {}", path.display()))
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
            .with_context(|| format!("chmod {}", path.display()))
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        std::os::unix::fs::symlink(target, link)
            .with_context(|| format!("symlink {} -> {}", link.display(), target.display()))
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
        fs::canonicalize(path).with_context(|| format!("realpath {}", path.display()))
    }

    /// `$TMPDIR`, falling back to `/tmp`.
    fn temp_dir(&self) -> PathBuf {
        std::env::var_os("TMPDIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TMP))
    }
}
