//! Download-then-extract provisioning of the Client Portal gateway.
//!
//! One linear sequence, each step owned by a sibling crate:
//!
//! 1. ensure the destination directory exists (`portal-fs`)
//! 2. GET the archive and validate the response (`portal-fetch`)
//! 3. load the bytes as an in-memory zip (`portal-archive`)
//! 4. extract every member under the destination (`portal-archive`)
//!
//! Configuration lives in [`ProvisionConfig`]; see [`config`] for layering.

pub mod config;
mod error;
mod provisioner;

pub use config::{ConfigFile, ProvisionConfig};
pub use error::{ConfigError, ErrorKind, ProvisionError, Result};
pub use provisioner::{ProvisionReport, Provisioner};

#[cfg(feature = "reqwest")]
pub use provisioner::download_and_extract;
