//! Data layer: request options and the buffered response.

use std::time::Duration;

use bytes::Bytes;

/// Options for a single archive request.
///
/// # Examples
///
/// ```
/// use portal_fetch::FetchOptions;
/// use std::time::Duration;
///
/// let options = FetchOptions::default().timeout(Duration::from_secs(60));
/// assert_eq!(options.timeout, Some(Duration::from_secs(60)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Upper bound on the whole request, body included.
    ///
    /// `None` waits until the server answers or the connection fails.
    ///
    /// Default: None
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }
}

/// A fully buffered HTTP response.
///
/// Header names are stored lower-cased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub url:     String,
    pub status:  u16,
    pub headers: Vec<(String, String)>,
    pub body:    Bytes,
}

impl RawResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> { self.header("content-type") }

    pub fn is_success(&self) -> bool { crate::core::is_success(self.status) }

    pub fn len(&self) -> usize { self.body.len() }

    pub fn is_empty(&self) -> bool { self.body.is_empty() }

    /// Give up the transport metadata and keep the payload.
    pub fn into_body(self) -> Bytes { self.body }
}
