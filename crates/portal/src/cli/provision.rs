use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use portal_provision::{ProvisionConfig, Provisioner};
use tracing::debug;

use super::ConfigArgs;
use crate::env;

#[derive(Args, Debug)]
pub struct Provision {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[arg(short, long, help = "Archive URL to download")]
    pub url: Option<String>,

    #[arg(short, long, value_name = "SECS", conflicts_with = "no_timeout", help = "Download timeout in seconds (0 waits indefinitely)")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Wait for the download indefinitely")]
    pub no_timeout: bool,

    #[arg(long, help = "Do not hold <dest>.lock while provisioning")]
    pub no_lock: bool,
}

impl Provision {
    pub async fn run(self) -> Result<()> {
        let config = self.config()?;
        let url = config.source_url.clone();

        let provisioner = Provisioner::with_default_client(config)?;
        let report = provisioner
            .download_and_extract()
            .await
            .with_context(|| format!("Failed to provision from {url}"))?;

        println!(
            "{} {} ({} files, {} bytes)",
            if report.created { "Created" } else { "Updated" },
            report.destination.display(),
            report.extracted.files,
            report.extracted.total_bytes,
        );
        Ok(())
    }

    /// File and defaults from [`env::load_config`], then this command's flags, resolved.
    pub fn config(&self) -> Result<ProvisionConfig> {
        let mut config = env::load_config(&self.config)?;
        if let Some(url) = &self.url {
            config = config.source_url(url);
        }
        if let Some(secs) = self.timeout {
            config = config.http_timeout((secs > 0).then(|| Duration::from_secs(secs)));
        }
        if self.no_timeout {
            config = config.http_timeout(None);
        }
        if self.no_lock {
            config = config.lock(false);
        }

        let config = env::resolve(config)?;
        debug!(
            url = %config.source_url,
            destination = %config.destination().display(),
            timeout = ?config.http_timeout,
            lock = config.lock,
            "resolved provisioning config"
        );
        Ok(config)
    }
}
