//! Error types for portal-fetch.

use std::time::Duration;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client")]
    Client(#[source] BoxError),

    #[error("request to '{url}' failed")]
    Network {
        url:    String,
        #[source]
        source: BoxError,
    },

    #[error("request to '{url}' timed out{}", fmt_timeout(.timeout))]
    Timeout { url: String, timeout: Option<Duration> },

    #[error("server answered '{url}' with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("expected an archive from '{url}' but got '{content_type}'")]
    UnexpectedContentType { url: String, content_type: String },
}

impl FetchError {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn fmt_timeout(timeout: &Option<Duration>) -> String {
    match timeout {
        Some(t) => format!(" after {}s", t.as_secs_f32()),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
