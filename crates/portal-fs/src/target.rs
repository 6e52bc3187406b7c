use std::io;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// The directory archive contents are provisioned into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetDir {
    path: PathBuf,
}

impl TargetDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Returns `true` if the target is present and is a directory.
    pub fn exists(&self) -> bool { self.path.is_dir() }

    /// Create the target directory and any missing parents.
    ///
    /// Returns `true` if this call created the directory, `false` if it was
    /// already there. Losing a creation race to another process counts as
    /// already present.
    pub fn ensure(&self) -> Result<bool> {
        if self.exists() {
            return Ok(false);
        }

        if self.path.exists() {
            return Err(Error::DirectoryCreation {
                path:   self.path.clone(),
                source: io::Error::new(
                    io::ErrorKind::NotADirectory,
                    "path exists and is not a directory",
                ),
            });
        }

        match std::fs::create_dir_all(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && self.exists() => Ok(false),
            Err(source) => Err(Error::DirectoryCreation {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Number of top-level entries in the directory, `None` if it is absent.
    pub fn entry_count(&self) -> Result<Option<usize>> {
        if !self.exists() {
            return Ok(None);
        }
        let entries = std::fs::read_dir(&self.path).map_err(|source| Error::DirectoryRead {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(entries.count()))
    }
}
