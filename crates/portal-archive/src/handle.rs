use std::io::Cursor;
use std::path::Path;

use bytes::Bytes;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::entry::{Entry, EntryKind, ExtractReport};
use crate::error::{Error, Result};
use crate::extract::{ensure_directory, plan_entry, write_file};
use crate::format;

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// A zip archive held entirely in memory.
///
/// Dropping the handle releases the buffer; nothing touches disk until
/// [`extract_all`](Self::extract_all).
pub struct ArchiveHandle {
    archive: ZipArchive<Cursor<Bytes>>,
}

impl std::fmt::Debug for ArchiveHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveHandle")
            .field("entries", &self.archive.len())
            .finish()
    }
}

impl ArchiveHandle {
    /// Interpret `bytes` as a zip archive.
    ///
    /// Fails with [`Error::Corrupt`] when the buffer lacks a zip signature or
    /// its central directory cannot be read.
    pub fn load(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if !format::is_zip(&bytes) {
            return Err(Error::corrupt("missing zip signature"));
        }

        let size = bytes.len();
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(Error::corrupt)?;
        debug!(bytes = size, entries = archive.len(), "archive loaded");
        Ok(Self { archive })
    }

    pub fn len(&self) -> usize { self.archive.len() }

    pub fn is_empty(&self) -> bool { self.archive.len() == 0 }

    /// List members in archive order without decompressing them.
    pub fn entries(&mut self) -> Result<Vec<Entry>> {
        (0..self.archive.len()).map(|index| self.entry_at(index)).collect()
    }

    fn entry_at(&mut self, index: usize) -> Result<Entry> {
        let file = self.archive.by_index_raw(index).map_err(Error::corrupt)?;
        let mode = file.unix_mode();
        let kind = if file.is_dir() {
            EntryKind::Directory
        } else if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
            EntryKind::Symlink
        } else {
            EntryKind::File
        };
        Ok(Entry::new(file.name(), file.size(), mode, kind))
    }

    /// Write every member under `destination`, consuming the handle.
    ///
    /// All member names are checked before the first write, so an archive
    /// with one unsafe entry writes nothing. Existing files are overwritten.
    pub fn extract_all(mut self, destination: &Path) -> Result<ExtractReport> {
        let mut planned = Vec::with_capacity(self.archive.len());
        for (index, entry) in self.entries()?.into_iter().enumerate() {
            if let Some(entry) = plan_entry(entry, destination)? {
                planned.push((index, entry));
            }
        }

        ensure_directory(destination)?;
        let mut report = ExtractReport::new(destination);

        for (index, entry) in planned {
            let Some(target) = entry.target_path.as_deref() else {
                continue;
            };

            let written = match entry.kind {
                EntryKind::Directory => {
                    ensure_directory(target)?;
                    0
                }
                _ => {
                    let mut file = self.archive.by_index(index).map_err(Error::corrupt)?;
                    write_file(&mut file, &entry, target)?
                }
            };

            debug!(entry = %entry.name, bytes = written, "extracted");
            report.record(entry, written);
        }

        info!(
            destination = %destination.display(),
            files = report.files,
            directories = report.directories,
            bytes = report.total_bytes,
            "archive extracted"
        );
        Ok(report)
    }
}
