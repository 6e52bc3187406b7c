use std::path::{Path, PathBuf};

/// An archive member as listed by [`ArchiveHandle::entries`](crate::ArchiveHandle::entries).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub target_path: Option<PathBuf>,
    pub size: u64,
    pub mode: Option<u32>,
    pub kind: EntryKind,
}

impl Entry {
    pub fn new(name: impl Into<String>, size: u64, mode: Option<u32>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            target_path: None,
            size,
            mode,
            kind,
        }
    }

    pub fn with_target_path(mut self, target_path: PathBuf) -> Self {
        self.target_path = Some(target_path);
        self
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    /// Check if entry is executable (has execute bit set)
    pub fn is_executable(&self) -> bool {
        self.mode.is_some_and(|m| m & 0o111 != 0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// What [`ArchiveHandle::extract_all`](crate::ArchiveHandle::extract_all) wrote.
#[derive(Clone, Debug)]
pub struct ExtractReport {
    pub destination: PathBuf,
    pub entries: Vec<Entry>,
    pub files: usize,
    pub directories: usize,
    pub total_bytes: u64,
}

impl ExtractReport {
    pub(crate) fn new(destination: &Path) -> Self {
        Self {
            destination: destination.to_path_buf(),
            entries: Vec::new(),
            files: 0,
            directories: 0,
            total_bytes: 0,
        }
    }

    pub(crate) fn record(&mut self, entry: Entry, written: u64) {
        match entry.kind {
            EntryKind::File => self.files += 1,
            EntryKind::Directory => self.directories += 1,
            EntryKind::Symlink => {}
        }
        self.total_bytes += written;
        self.entries.push(entry);
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
