//! Error types for provisioning.

use std::io;
use std::path::PathBuf;

use portal_archive::Error as ArchiveError;
use portal_fetch::FetchError;
use thiserror::Error;

/// Any failure of the provisioning sequence. Step errors pass through
/// unchanged; [`ProvisionError::kind`] tells them apart.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Filesystem(#[from] portal_fs::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    DirectoryCreation,
    DirectoryRead,
    Lock,
    Fetch,
    CorruptArchive,
    UnsafeArchiveEntry,
    Extraction,
    Config,
}

impl ProvisionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Filesystem(portal_fs::Error::DirectoryCreation { .. }) => ErrorKind::DirectoryCreation,
            Self::Filesystem(portal_fs::Error::DirectoryRead { .. }) => ErrorKind::DirectoryRead,
            Self::Filesystem(portal_fs::Error::Lock { .. }) => ErrorKind::Lock,
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Archive(ArchiveError::Corrupt { .. }) => ErrorKind::CorruptArchive,
            Self::Archive(ArchiveError::UnsafeEntry { .. }) => ErrorKind::UnsafeArchiveEntry,
            Self::Archive(ArchiveError::Extraction { .. }) => ErrorKind::Extraction,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path:   PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to determine current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("cannot expand '~': home directory unknown")]
    NoHome,
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
