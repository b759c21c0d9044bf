//! USGS (United States Geological Survey) earthquake feed provider.
//!
//! Fetches the real-time QuakeML summary feeds published by the USGS
//! Earthquake Hazards Program.
//!
//! # URL Pattern
//!
//! `https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_{window}.quakeml`
//!
//! - `{window}` is one of `hour`, `day`, `week`, `month`
//! - No authentication required
//! - Body is a QuakeML 1.2 document
//!
//! Any endpoint template containing `{window}` can be used in place of the
//! USGS default, e.g. a local mirror.

use tracing::debug;

use crate::provider::{AsyncHttpClient, ProviderError, TimeWindow};

/// Default USGS summary feed endpoint template.
pub const USGS_FEED_ENDPOINT: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_{window}.quakeml";

/// Placeholder replaced by the time-window token.
pub const WINDOW_PLACEHOLDER: &str = "{window}";

/// Earthquake feed provider.
///
/// # Example
///
/// ```ignore
/// use quakemap::provider::{AsyncReqwestClient, FeedProvider, TimeWindow};
///
/// let client = AsyncReqwestClient::new()?;
/// let provider = FeedProvider::usgs(client);
/// let body = provider.fetch(TimeWindow::Day).await?;
/// ```
pub struct FeedProvider<C: AsyncHttpClient> {
    http_client: C,
    endpoint: String,
}

impl<C: AsyncHttpClient> FeedProvider<C> {
    /// Creates a provider for a custom endpoint template.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `endpoint` - URL template containing `{window}`
    pub fn new(http_client: C, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    /// Creates a provider for the USGS summary feeds.
    pub fn usgs(http_client: C) -> Self {
        Self::new(http_client, USGS_FEED_ENDPOINT)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn http_client(&self) -> &C {
        &self.http_client
    }

    /// Builds the feed URL for a time window.
    pub fn build_url(&self, window: TimeWindow) -> String {
        self.endpoint.replace(WINDOW_PLACEHOLDER, window.token())
    }

    /// Fetches the raw feed document for a time window.
    pub async fn fetch(&self, window: TimeWindow) -> Result<String, ProviderError> {
        let url = self.build_url(window);
        debug!(url = %url, "Fetching earthquake feed");

        let body = self.http_client.get(&url).await?;
        let text = String::from_utf8(body)
            .map_err(|e| ProviderError::InvalidBody(format!("{} from {}", e, url)))?;

        debug!(url = %url, bytes = text.len(), "Fetched earthquake feed");
        Ok(text)
    }
}
