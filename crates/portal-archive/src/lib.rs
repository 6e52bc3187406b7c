//! In-memory zip loading and extraction with path sanitization.
//!
//! # Architecture
//!
//! - `format.rs` - Zip signature check
//! - `sanitize.rs` - Path sanitization (zip-slip prevention)
//! - `handle.rs` - [`ArchiveHandle`], the loaded archive
//! - `extract.rs` - Writing entries to disk
//! - `entry.rs` - Shared types

pub use entry::{Entry, EntryKind, ExtractReport};
pub use error::{Error, Result};
pub use format::is_zip;
pub use handle::ArchiveHandle;
pub use sanitize::{SanitizedPath, sanitize_entry_path};

use std::path::Path;

use bytes::Bytes;

mod entry;
mod error;
mod extract;
mod format;
mod handle;
mod sanitize;

/// Interpret an in-memory buffer as a zip archive.
pub fn load(bytes: impl Into<Bytes>) -> Result<ArchiveHandle> {
    ArchiveHandle::load(bytes)
}

/// Write every member of `handle` under `destination`.
pub fn extract_all(handle: ArchiveHandle, destination: &Path) -> Result<ExtractReport> {
    handle.extract_all(destination)
}
