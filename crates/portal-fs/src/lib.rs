//! Destination directory setup for the portal provisioner.
//!
//! - [`TargetDir`] answers "is it there?" and creates it idempotently.
//! - [`LockFile`] serializes concurrent provisioners of one destination.

mod error;
mod lock;
mod target;

pub use error::{Error, Result};
pub use lock::{LockFile, LockGuard, OwnedLockGuard, lock_path_for};
pub use target::TargetDir;
