//! Single-shot HTTP archive download with response validation.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Request options and the buffered response
//! - [`core`] - Pure checks on URLs and responses
//! - [`effects`] - I/O behind the [`HttpClient`] trait
//!
//! Nothing is streamed, retried or verified against a checksum. A response
//! only leaves [`Fetcher::fetch`] once it has a success status and does not
//! look like an HTML error page.

pub mod core;
pub mod data;
mod effects;
mod error;

pub use data::{FetchOptions, RawResponse};
pub use effects::{Fetcher, HttpClient};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{BoxError, FetchError, Result};
