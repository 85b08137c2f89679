//! Plain-text sitemap source.
//!
//! A `sitemap.txt` is simply one absolute URL per line.  Fetching is a
//! single blocking GET; parsing trims every line and drops blank ones.

use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder};

use super::UrlSource;
use crate::error::FetchError;

/// A sitemap served as newline-delimited text.
pub struct SitemapSource {
    /// Location of the sitemap.
    pub url: String,
    client: Client,
}

impl SitemapSource {
    /// Create a source that identifies itself with `user_agent` and gives up
    /// after `timeout`.
    pub fn new(url: impl Into<String>, user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = Self::client_builder(user_agent, timeout).build()?;
        Ok(Self::with_client(url, client))
    }

    fn client_builder(user_agent: &str, timeout: Duration) -> ClientBuilder {
        Client::builder().user_agent(user_agent).timeout(timeout)
    }

    /// Create a source on top of an already-configured client.
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

/// Split a sitemap body into URLs.
///
/// Pure function (no I/O) so that tests can exercise parsing without the
/// network.
pub fn parse_sitemap(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

impl UrlSource for SitemapSource {
    fn name(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<Vec<String>, FetchError> {
        let body = self
            .client
            .get(&self.url)
            .send()?
            .error_for_status()?
            .text()?;
        let urls = parse_sitemap(&body);
        tracing::info!("Fetched {} URLs from {}", urls.len(), self.url);
        Ok(urls)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
