use anyhow::{Context, Result};
use clap::Args;
use portal_fs::{LockFile, TargetDir, lock_path_for};
use tracing::debug;

use super::ConfigArgs;
use crate::env;

#[derive(Args, Debug)]
pub struct Status {
    #[command(flatten)]
    pub config: ConfigArgs,
}

impl Status {
    pub fn run(self) -> Result<()> {
        let config = env::resolve(env::load_config(&self.config)?)?;
        let target = TargetDir::new(config.destination());

        match target.entry_count()? {
            Some(count) => println!("{}: present ({count} entries)", target.path().display()),
            None => println!("{}: missing", target.path().display()),
        }

        if provisioning_in_progress(&target)? {
            println!("another provisioning run holds the lock");
        }
        Ok(())
    }
}

/// Probe the sibling lock without creating it.
fn provisioning_in_progress(target: &TargetDir) -> Result<bool> {
    let lock_path = lock_path_for(target.path())?;
    if !lock_path.is_file() {
        debug!(lock = %lock_path.display(), "no lock file");
        return Ok(false);
    }
    let mut lock = LockFile::open(&lock_path)
        .with_context(|| format!("Failed to open lock file {}", lock_path.display()))?;
    Ok(lock.try_acquire()?.is_none())
}
