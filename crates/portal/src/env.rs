//! Assembles a [`ProvisionConfig`] from the config file and command-line flags.

use std::time::Duration;

use anyhow::{Context, Result};
use portal_provision::{ConfigFile, ProvisionConfig};

use crate::cli::ConfigArgs;

/// The CLI waits this long for the download unless told otherwise.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Defaults, then `--config`, then `--dest`. Not yet resolved.
pub fn load_config(args: &ConfigArgs) -> Result<ProvisionConfig> {
    let mut config = ProvisionConfig::default().http_timeout(Some(DEFAULT_HTTP_TIMEOUT));

    if let Some(path) = &args.config {
        let file = ConfigFile::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
        config = config.merge(file);
    }
    if let Some(dest) = &args.dest {
        config = config.destination_dir(dest);
    }
    Ok(config)
}

/// Pin the destination to an absolute path under `$PORTAL_HOME` or the working directory.
pub fn resolve(config: ProvisionConfig) -> Result<ProvisionConfig> {
    config
        .resolve_from_env()
        .context("Failed to resolve the destination directory")
}
