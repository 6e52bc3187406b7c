use tracing::{debug, info};

use crate::core::{parse_url, validate_response};
use crate::data::{FetchOptions, RawResponse};
use crate::effects::http::HttpClient;
use crate::error::Result;

/// Downloads an archive into memory and refuses anything that is not one.
pub struct Fetcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C { &self.client }

    /// Issue one GET for `url` and return the validated response.
    ///
    /// Fails with `FetchError::InvalidUrl` before touching the network, and
    /// with `FetchError::Status` / `FetchError::UnexpectedContentType` when
    /// the server answered with something other than an archive.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<RawResponse> {
        let url = parse_url(url)?;
        debug!(%url, timeout = ?options.timeout, "requesting archive");

        let response = self.client.get(&url, options.timeout).await?;
        debug!(
            status = response.status,
            content_type = response.content_type().unwrap_or("-"),
            bytes = response.len(),
            "response received"
        );

        validate_response(&response)?;
        info!(url = %response.url, bytes = response.len(), "archive downloaded");
        Ok(response)
    }
}
