use std::path::{Path, PathBuf};

/// Kind of a directory entry. The discriminants are stable and match [`EntryType::code`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EntryType {
    File = 0,
    Directory = 1,
    Symlink = 2,
    Fifo = 3,
    Socket = 4,
    BlockDevice = 5,
    CharDevice = 6,
    Other = 7,
}

impl EntryType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<EntryType> {
        let entry_type = match code {
            0 => EntryType::File,
            1 => EntryType::Directory,
            2 => EntryType::Symlink,
            3 => EntryType::Fifo,
            4 => EntryType::Socket,
            5 => EntryType::BlockDevice,
            6 => EntryType::CharDevice,
            7 => EntryType::Other,
            _ => return None,
        };
        Some(entry_type)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EntryFlags {
    /// Dot-file on POSIX, hidden attribute on Windows.
    pub hidden: bool,
    pub readonly: bool,
    /// Windows system attribute; always false on POSIX.
    pub system: bool,
    pub executable: bool,
}

/// Metadata snapshot of a single filesystem object.
///
/// Timestamps are seconds since the Unix epoch; a timestamp the platform cannot provide
/// is 0. `uid`/`gid` are 0 where the platform has no such notion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub entry_type: EntryType,
    pub size: u64,
    pub allocated_size: u64,
    pub modified: u64,
    pub accessed: u64,
    pub changed: u64,
    pub created: u64,
    /// POSIX permission bits (`0o7777` mask).
    pub permissions: u32,
    pub uid: u32,
    pub gid: u32,
    pub flags: EntryFlags,
}

impl Entry {
    /// Entry with the name taken from the last component of `path` and zeroed metadata.
    pub fn new<P: AsRef<Path>>(path: P, entry_type: EntryType) -> Entry {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Entry {
            name,
            path: path.to_path_buf(),
            entry_type,
            size: 0,
            allocated_size: 0,
            modified: 0,
            accessed: 0,
            changed: 0,
            created: 0,
            permissions: 0,
            uid: 0,
            gid: 0,
            flags: EntryFlags::default(),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.entry_type == EntryType::Symlink
    }
}
