use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("archive is corrupted: {reason}")]
    Corrupt { reason: String },

    #[error("unsafe archive entry '{entry}': {reason}")]
    UnsafeEntry { entry: String, reason: &'static str },

    #[error("failed to extract '{path}': {source}")]
    Extraction { path: PathBuf, source: io::Error },
}

impl Error {
    pub(crate) fn corrupt(reason: impl ToString) -> Self {
        Self::Corrupt {
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
