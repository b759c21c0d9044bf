//! Earthquake feed provider abstraction
//!
//! This module provides the HTTP client trait and the feed provider that
//! downloads QuakeML documents for a [`TimeWindow`].
//!
//! ```ignore
//! use quakemap::provider::{AsyncReqwestClient, FeedProvider};
//!
//! let http_client = AsyncReqwestClient::new()?;
//! let provider = FeedProvider::usgs(http_client);
//! ```

mod http;
mod types;
mod usgs;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use types::{ProviderError, TimeWindow, UnknownTimeWindow};
pub use usgs::{FeedProvider, USGS_FEED_ENDPOINT, WINDOW_PLACEHOLDER};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
