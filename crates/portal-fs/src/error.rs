use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreation { path: PathBuf, source: io::Error },

    #[error("failed to read directory '{path}': {source}")]
    DirectoryRead { path: PathBuf, source: io::Error },

    #[error("failed to lock '{path}': {source}")]
    Lock { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::DirectoryCreation { path, .. }
            | Self::DirectoryRead { path, .. }
            | Self::Lock { path, .. } => path,
        }
    }
}
