use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Result of sanitizing an archive entry name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizedPath {
    pub original: String,
    /// Normalized path relative to the destination. Empty for the root.
    pub relative: PathBuf,
    pub resolved: PathBuf,
}

impl SanitizedPath {
    /// The entry names the destination directory itself (`./`).
    pub fn is_root(&self) -> bool { self.relative.as_os_str().is_empty() }
}

/// Map an archive entry name onto a path under `base`.
///
/// Both `/` and `\` separate segments. Empty and `.` segments are dropped and
/// `..` pops the previous segment. Names that are absolute, carry a drive
/// prefix or a NUL byte, or whose `..` segments climb above `base` are
/// rejected with [`Error::UnsafeEntry`].
pub fn sanitize_entry_path(entry: &str, base: &Path) -> Result<SanitizedPath> {
    let unsafe_entry = |reason| Error::UnsafeEntry {
        entry: entry.to_string(),
        reason,
    };

    if entry.contains('\0') {
        return Err(unsafe_entry("entry name contains a NUL byte"));
    }

    let normalized = entry.replace('\\', "/");
    if normalized.starts_with('/') {
        return Err(unsafe_entry("absolute path"));
    }

    let mut segments: Vec<&str> = Vec::new();
    for (i, segment) in normalized.split('/').enumerate() {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(unsafe_entry("path escapes the destination directory"));
                }
            }
            s if i == 0 && has_drive_prefix(s) => {
                return Err(unsafe_entry("path carries a drive prefix"));
            }
            s => segments.push(s),
        }
    }

    let relative: PathBuf = segments.iter().collect();
    Ok(SanitizedPath {
        original: entry.to_string(),
        resolved: base.join(&relative),
        relative,
    })
}

fn has_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
