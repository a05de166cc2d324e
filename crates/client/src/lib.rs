// ABOUTME: Async client for postscout: discovers a post source for a site and fetches its normalized post list.
// ABOUTME: Wraps reqwest; all mapping logic lives in postscout-feed and stays pure.

use std::time::Duration;

pub mod discover;
pub mod error;
pub mod fetch;
pub mod options;
pub mod transport;

pub use error::ClientError;
pub use options::{
    DiscoverOptions, FetchOptions, WordpressOptions, DEFAULT_FEED_PATHS, DEFAULT_WP_API_PATHS,
};
pub use postscout_feed::{DiscoveredSource, PostList};

/// The discovery and fetch client.
///
/// Holds only an HTTP client; every call is a single-shot operation and no
/// state persists between calls. Callers may cache the discovered source
/// themselves, since feed locations rarely change.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
}

impl Client {
    /// A client with default settings.
    pub fn new() -> Self {
        ClientBuilder::new().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Looks through the site's metadata (and optionally a set of
    /// well-known paths) for a usable post source.
    ///
    /// Strategies run in a strict order — HTTP `Link` header hint, HTML
    /// `<link>` metadata, then guessed WordPress and feed paths — and the
    /// first accepted source wins. With `prefer_feeds` each pair runs in
    /// the reverse order. Fails with [`ClientError::NoSourceFound`] when
    /// every enabled strategy comes up empty.
    pub async fn discover_source(
        &self,
        site_url: &str,
        options: &DiscoverOptions,
    ) -> Result<DiscoveredSource, ClientError> {
        discover::discover_source(&self.http, site_url, options).await
    }

    /// Fetches and normalizes the post list behind a source. The source
    /// can be reused across calls whenever the list needs refreshing.
    pub async fn fetch_post_list(
        &self,
        source: &DiscoveredSource,
        options: &FetchOptions,
    ) -> Result<PostList, ClientError> {
        fetch::fetch_post_list(&self.http, source, options).await
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Client`] instances.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    timeout: Duration,
    user_agent: String,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("postscout/", env!("CARGO_PKG_VERSION")).to_string(),
            http_client: None,
        }
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Uses a pre-configured HTTP client instead of building one.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http_client = Some(http);
        self
    }

    pub fn build(self) -> Client {
        let http = self.http_client.unwrap_or_else(|| {
            reqwest::Client::builder()
                .timeout(self.timeout)
                .user_agent(self.user_agent)
                .build()
                .unwrap_or_default()
        });

        Client { http }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
