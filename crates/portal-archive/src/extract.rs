//! Writing planned entries to disk.
//!
//! # Platform Behavior
//!
//! **Unix**: permission bits stored in the archive are applied to written
//! files, always keeping the owner write bit so a later run can overwrite.
//!
//! **Windows (non-Unix)**: permission handling is a no-op.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use crate::entry::{Entry, EntryKind};
use crate::error::{Error, Result};
use crate::sanitize::sanitize_entry_path;

const COPY_BUFFER: usize = 64 * 1024;

/// Decide where an entry goes, or reject it. `Ok(None)` skips the entry.
pub(crate) fn plan_entry(entry: Entry, destination: &Path) -> Result<Option<Entry>> {
    if entry.kind == EntryKind::Symlink {
        return Err(Error::UnsafeEntry {
            entry:  entry.name,
            reason: "symbolic links are not extracted",
        });
    }

    let sanitized = sanitize_entry_path(&entry.name, destination)?;
    if sanitized.is_root() {
        return match entry.kind {
            EntryKind::Directory => Ok(None),
            _ => Err(Error::UnsafeEntry {
                entry:  entry.name,
                reason: "entry has no file name",
            }),
        };
    }

    Ok(Some(entry.with_target_path(sanitized.resolved)))
}

pub(crate) fn ensure_directory(path: &Path) -> Result<()> {
    if !path.is_dir() {
        std::fs::create_dir_all(path).map_err(|source| Error::Extraction {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Stream one member into `target`, replacing whatever file is there.
pub(crate) fn write_file(reader: &mut dyn Read, entry: &Entry, target: &Path) -> Result<u64> {
    if let Some(parent) = target.parent() {
        ensure_directory(parent)?;
    }

    let mut file = File::create(target).map_err(|source| Error::Extraction {
        path: target.to_path_buf(),
        source,
    })?;

    let written = copy_entry(reader, &mut file, &entry.name, target)?;
    apply_mode(target, entry.mode)?;
    Ok(written)
}

/// Copy that tells decode failures (corrupt) from write failures (disk).
fn copy_entry(reader: &mut dyn Read, writer: &mut File, name: &str, target: &Path) -> Result<u64> {
    let mut buf = vec![0u8; COPY_BUFFER];
    let mut written = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::corrupt(format!("entry '{name}': {e}"))),
        };
        writer.write_all(&buf[..n]).map_err(|source| Error::Extraction {
            path: target.to_path_buf(),
            source,
        })?;
        written += n as u64;
    }

    writer.flush().map_err(|source| Error::Extraction {
        path: target.to_path_buf(),
        source,
    })?;
    Ok(written)
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let Some(bits) = mode.map(|m| m & 0o777).filter(|m| *m != 0) else {
        return Ok(());
    };
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(bits | 0o200)).map_err(|source| {
        Error::Extraction {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<()> { Ok(()) }
