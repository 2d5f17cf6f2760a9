use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use crate::core::Result;
use crate::dir::Entry;
use crate::dir::platform::Platform;

/// Order in which a [`DirIter`] yields entries.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Whatever order the platform returns.
    #[default]
    None,
    Name,
    Size,
    Modified,
}

/// Tunables of [`Directory::iter_with`](crate::dir::Directory::iter_with).
///
/// Hidden and system entries that are excluded are not descended into either; `filter`
/// only decides what is yielded.
pub struct IterOptions {
    pub recursive: bool,
    /// Descend into symlinked directories. Each real directory is visited at most once.
    pub follow_symlinks: bool,
    pub include_hidden: bool,
    pub include_system: bool,
    pub sort: SortMode,
    pub filter: Option<Box<dyn Fn(&Entry) -> bool>>,
}

impl Default for IterOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            follow_symlinks: false,
            include_hidden: true,
            include_system: true,
            sort: SortMode::None,
            filter: None,
        }
    }
}

impl fmt::Debug for IterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterOptions")
            .field("recursive", &self.recursive)
            .field("follow_symlinks", &self.follow_symlinks)
            .field("include_hidden", &self.include_hidden)
            .field("include_system", &self.include_system)
            .field("sort", &self.sort)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

impl IterOptions {
    pub fn recursive() -> Self {
        Self {
            recursive: true,
            ..Self::default()
        }
    }
}

/// Forward iterator over the entries of a directory, `.` and `..` excluded.
///
/// Open platform handles are closed when the iterator is exhausted, dropped or
/// explicitly [`close`](DirIter::close)d.
pub struct DirIter<'a, P: Platform> {
    platform: &'a P,
    options: IterOptions,
    handles: Vec<P::Handle>,
    visited: HashSet<PathBuf>,
    sorted: Option<std::vec::IntoIter<Entry>>,
}

impl<'a, P: Platform> DirIter<'a, P> {
    pub(crate) fn open(platform: &'a P, path: &Path, options: IterOptions) -> Result<Self> {
        let handle = platform.opendir(path)?;
        let mut visited = HashSet::new();
        if options.follow_symlinks {
            visited.insert(platform.realpath(path)?);
        }

        let sort = options.sort;
        let mut iter = Self {
            platform,
            options,
            handles: vec![handle],
            visited,
            sorted: None,
        };

        if sort != SortMode::None {
            let mut entries = Vec::new();
            while let Some(entry) = iter.next_unsorted()? {
                entries.push(entry);
            }
            sort_entries(&mut entries, sort);
            iter.sorted = Some(entries.into_iter());
        }
        Ok(iter)
    }

    fn is_excluded(&self, entry: &Entry) -> bool {
        (!self.options.include_hidden && entry.flags.hidden)
            || (!self.options.include_system && entry.flags.system)
    }

    /// Whether a recursive walk continues below `entry`.
    fn should_descend(&mut self, entry: &Entry) -> Result<bool> {
        if !self.options.recursive {
            return Ok(false);
        }
        if entry.is_dir() && !self.options.follow_symlinks {
            return Ok(true);
        }
        if !self.options.follow_symlinks {
            return Ok(false);
        }

        let is_dir = entry.is_dir()
            || (entry.is_symlink()
                && self
                    .platform
                    .stat(&entry.path)
                    .map(|target| target.is_dir())
                    .unwrap_or(false));
        if !is_dir {
            return Ok(false);
        }
        let real = self.platform.realpath(&entry.path)?;
        if !self.visited.insert(real) {
            trace!(path = %entry.path.display(), "directory already visited");
            return Ok(false);
        }
        Ok(true)
    }

    fn next_unsorted(&mut self) -> Result<Option<Entry>> {
        loop {
            let Some(handle) = self.handles.last_mut() else {
                return Ok(None);
            };
            let Some(entry) = self.platform.readdir(handle)? else {
                if let Some(handle) = self.handles.pop() {
                    self.platform.closedir(handle)?;
                }
                continue;
            };

            if self.is_excluded(&entry) {
                continue;
            }
            if self.should_descend(&entry)? {
                trace!(path = %entry.path.display(), "descending");
                let handle = self.platform.opendir(&entry.path)?;
                self.handles.push(handle);
            }
            if let Some(filter) = &self.options.filter {
                if !filter(&entry) {
                    continue;
                }
            }
            return Ok(Some(entry));
        }
    }

    /// Closes every open handle, reporting the first failure.
    pub fn close(mut self) -> Result<()> {
        self.close_handles()
    }

    fn close_handles(&mut self) -> Result<()> {
        let mut result = Ok(());
        while let Some(handle) = self.handles.pop() {
            if let Err(err) = self.platform.closedir(handle) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }
}

impl<P: Platform> Iterator for DirIter<'_, P> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(sorted) = &mut self.sorted {
            return sorted.next().map(Ok);
        }
        match self.next_unsorted() {
            Ok(entry) => entry.map(Ok),
            Err(err) => {
                // a failed stream cannot be resumed
                let _ = self.close_handles();
                Some(Err(err))
            }
        }
    }
}

impl<P: Platform> Drop for DirIter<'_, P> {
    fn drop(&mut self) {
        if let Err(err) = self.close_handles() {
            warn!("failed to close directory stream: {err:#}");
        }
    }
}

fn sort_entries(entries: &mut [Entry], sort: SortMode) {
    match sort {
        SortMode::None => {}
        SortMode::Name => entries.sort_by(|a, b| a.path.cmp(&b.path)),
        SortMode::Size => entries.sort_by(|a, b| a.size.cmp(&b.size).then_with(|| a.path.cmp(&b.path))),
        SortMode::Modified => {
            entries.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dir::EntryType;

    fn entry(path: &str, size: u64, modified: u64) -> Entry {
        let mut entry = Entry::new(path, EntryType::File);
        entry.size = size;
        entry.modified = modified;
        entry
    }

    #[test]
    fn test_sort_entries() {
        let mut entries = vec![entry("/b", 1, 30), entry("/a", 3, 10), entry("/c", 2, 20)];

        sort_entries(&mut entries, SortMode::Name);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);

        sort_entries(&mut entries, SortMode::Size);
        let sizes: Vec<_> = entries.iter().map(|e| e.size).collect();
        assert_eq!(sizes, [1, 2, 3]);

        sort_entries(&mut entries, SortMode::Modified);
        let times: Vec<_> = entries.iter().map(|e| e.modified).collect();
        assert_eq!(times, [10, 20, 30]);
    }

    #[test]
    fn test_options_debug_hides_closure() {
        let options = IterOptions {
            filter: Some(Box::new(|e: &Entry| e.is_file())),
            ..IterOptions::recursive()
        };
        let text = format!("{options:?}");
        assert!(text.contains("recursive: true"));
        assert!(text.contains("filter: true"));
    }
}
