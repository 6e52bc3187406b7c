use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Args};
use portal_archive::EntryKind;
use portal_fetch::{FetchOptions, Fetcher, ReqwestClient};
use tracing::debug;

use crate::env::DEFAULT_HTTP_TIMEOUT;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "file"])))]
pub struct Inspect {
    #[arg(short, long, help = "Download and list a remote archive")]
    pub url: Option<String>,

    #[arg(short, long, help = "List a local archive")]
    pub file: Option<PathBuf>,

    #[arg(short, long, value_name = "SECS", help = "Download timeout in seconds (0 waits indefinitely)")]
    pub timeout: Option<u64>,
}

impl Inspect {
    pub async fn run(self) -> Result<()> {
        let bytes = if let Some(url) = &self.url {
            let options = FetchOptions {
                timeout: match self.timeout {
                    Some(0) => None,
                    Some(secs) => Some(Duration::from_secs(secs)),
                    None => Some(DEFAULT_HTTP_TIMEOUT),
                },
            };
            Fetcher::new(ReqwestClient::new()?)
                .fetch(url, &options)
                .await
                .with_context(|| format!("Failed to download {url}"))?
                .into_body()
        } else if let Some(path) = &self.file {
            std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?
                .into()
        } else {
            bail!("either --url or --file is required");
        };

        debug!(bytes = bytes.len(), "loading archive");
        let mut handle = portal_archive::load(bytes).context("Not a usable archive")?;
        let entries = handle.entries()?;

        for entry in &entries {
            let kind = match entry.kind {
                EntryKind::File => "file",
                EntryKind::Directory => "dir",
                EntryKind::Symlink => "link",
            };
            let mode = entry.mode.map_or_else(|| "----".to_string(), |m| format!("{:04o}", m & 0o7777));
            println!("{kind:<4} {mode} {:>10}  {}", entry.size, entry.name);
        }
        println!(
            "{} entries, {} bytes",
            entries.len(),
            entries.iter().map(|e| e.size).sum::<u64>()
        );
        Ok(())
    }
}
