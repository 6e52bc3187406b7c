use std::io;
use std::path::{Path, PathBuf};

use portal_archive::{ArchiveHandle, Error as ArchiveError, ExtractReport};
use portal_fetch::{FetchOptions, Fetcher, HttpClient, RawResponse};
use portal_fs::{LockFile, TargetDir};
use tracing::{debug, info};

use crate::config::ProvisionConfig;
use crate::error::Result;

/// Outcome of a successful [`Provisioner::download_and_extract`].
#[derive(Clone, Debug)]
pub struct ProvisionReport {
    pub destination:      PathBuf,
    /// The destination directory did not exist before this run.
    pub created:          bool,
    pub status:           u16,
    pub downloaded_bytes: u64,
    pub extracted:        ExtractReport,
}

/// Runs the provisioning steps against one configuration.
///
/// The steps are public so callers can drive them one at a time:
/// [`ensure_directory`](Self::ensure_directory) → [`fetch`](Self::fetch) →
/// [`load`](Self::load) → [`extract`](Self::extract).
pub struct Provisioner<C: HttpClient> {
    config:  ProvisionConfig,
    target:  TargetDir,
    fetcher: Fetcher<C>,
}

impl<C: HttpClient> Provisioner<C> {
    /// `config.destination_dir` is used as given; resolve it first.
    pub fn new(config: ProvisionConfig, client: C) -> Self {
        Self {
            target: TargetDir::new(&config.destination_dir),
            fetcher: Fetcher::new(client),
            config,
        }
    }

    pub fn config(&self) -> &ProvisionConfig { &self.config }

    pub fn client(&self) -> &C { self.fetcher.client() }

    pub fn destination(&self) -> &Path { self.target.path() }

    /// Whether the destination directory is already present.
    pub fn exists(&self) -> bool { self.target.exists() }

    /// Create the destination if missing. `true` if this call created it.
    pub fn ensure_directory(&self) -> Result<bool> {
        let created = self.target.ensure()?;
        debug!(destination = %self.destination().display(), created, "destination ready");
        Ok(created)
    }

    /// Download the archive; non-archive responses are errors.
    pub async fn fetch(&self) -> Result<RawResponse> {
        let options = FetchOptions {
            timeout: self.config.http_timeout,
        };
        Ok(self.fetcher.fetch(&self.config.source_url, &options).await?)
    }

    /// Open the downloaded payload as an archive.
    pub fn load(response: RawResponse) -> Result<ArchiveHandle> {
        Ok(ArchiveHandle::load(response.into_body())?)
    }

    /// Unpack every member into the destination.
    pub fn extract(&self, handle: ArchiveHandle) -> Result<ExtractReport> {
        Ok(handle.extract_all(self.destination())?)
    }

    /// [`extract`](Self::extract) on the blocking pool.
    async fn extract_blocking(&self, handle: ArchiveHandle) -> Result<ExtractReport> {
        let destination = self.destination().to_path_buf();
        let task = tokio::task::spawn_blocking({
            let destination = destination.clone();
            move || handle.extract_all(&destination)
        });
        match task.await {
            Ok(report) => Ok(report?),
            Err(join) => Err(ArchiveError::Extraction {
                path:   destination,
                source: io::Error::other(join),
            }
            .into()),
        }
    }

    /// Ensure, fetch, load and extract, in that order.
    ///
    /// With `lock` on, runs on the same destination are serialized, whether
    /// they come from other processes or other tasks of this one.
    ///
    /// The first failing step's error is returned as-is. Nothing is rolled
    /// back: a failed run may leave the directory created or partly filled.
    pub async fn download_and_extract(&self) -> Result<ProvisionReport> {
        let _guard = if self.config.lock {
            Some(LockFile::for_destination(self.destination())?.acquire_owned().await?)
        } else {
            None
        };

        info!(
            url = %self.config.source_url,
            destination = %self.destination().display(),
            "provisioning client portal"
        );

        let created = self.ensure_directory()?;
        let response = self.fetch().await?;
        let status = response.status;
        let downloaded_bytes = response.len() as u64;

        let handle = Self::load(response)?;
        let extracted = self.extract_blocking(handle).await?;

        info!(
            files = extracted.files,
            bytes = extracted.total_bytes,
            "client portal provisioned"
        );

        Ok(ProvisionReport {
            destination: self.destination().to_path_buf(),
            created,
            status,
            downloaded_bytes,
            extracted,
        })
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use portal_fetch::ReqwestClient;

    use super::*;

    impl Provisioner<ReqwestClient> {
        /// Provisioner backed by a default reqwest client.
        pub fn with_default_client(config: ProvisionConfig) -> Result<Self> {
            Ok(Self::new(config, ReqwestClient::new()?))
        }
    }

    /// Provision with `config`, resolving its destination from the environment.
    pub async fn download_and_extract(config: ProvisionConfig) -> Result<ProvisionReport> {
        let config = config.resolve_from_env()?;
        Provisioner::with_default_client(config)?.download_and_extract().await
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::download_and_extract;
