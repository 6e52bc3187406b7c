use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::data::RawResponse;
use crate::error::Result;

/// Asynchronous HTTP client abstraction.
///
/// The one operation needed here is a buffered GET. Implementations handle
/// their own redirect following and map transport failures onto
/// [`FetchError`](crate::FetchError): elapsed timeouts become
/// `FetchError::Timeout`, everything else `FetchError::Network`. Status codes
/// are returned as-is; judging them is the caller's job.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// Issue a GET for `url` and buffer the whole body.
    ///
    /// `timeout` bounds the entire exchange; `None` waits indefinitely.
    fn get(
        &self,
        url: &Url,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<RawResponse>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use crate::error::FetchError;

    const USER_AGENT: &str = concat!("portal/", env!("CARGO_PKG_VERSION"));

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone, Debug)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Create a new ReqwestClient with default configuration.
        pub fn new() -> Result<Self> {
            let client = reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| FetchError::Client(Box::new(e)))?;
            Ok(Self { client })
        }

        /// Wrap an already configured client (proxies, custom TLS roots).
        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    impl HttpClient for ReqwestClient {
        async fn get(&self, url: &Url, timeout: Option<Duration>) -> Result<RawResponse> {
            let mut request = self.client.get(url.clone());
            if let Some(timeout) = timeout {
                request = request.timeout(timeout);
            }

            let response = request
                .send()
                .await
                .map_err(|e| transport_error(url, timeout, e))?;

            let status = response.status().as_u16();
            let final_url = response.url().to_string();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();

            let body = response
                .bytes()
                .await
                .map_err(|e| transport_error(url, timeout, e))?;

            Ok(RawResponse {
                url: final_url,
                status,
                headers,
                body,
            })
        }
    }

    fn transport_error(url: &Url, timeout: Option<Duration>, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            FetchError::Network {
                url:    url.to_string(),
                source: Box::new(err),
            }
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
