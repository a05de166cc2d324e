// ABOUTME: Configuration records for discovery and fetch, with the default guess-path lists.
// ABOUTME: Path defaults are configuration constants threaded through the options, not mutable globals.

use std::collections::BTreeMap;
use std::fmt;

use postscout_feed::DiscoveredSource;

/// Feed paths probed when guessing is enabled and no explicit list is
/// configured.
pub const DEFAULT_FEED_PATHS: [&str; 6] = [
    "./feed",
    "./atom",
    "./rss",
    "./feed.json",
    "./feed.xml",
    "?feed=atom",
];

/// WordPress API paths probed when guessing is enabled and no explicit
/// list is configured.
pub const DEFAULT_WP_API_PATHS: [&str; 2] = ["./wp-json", "?rest_route=/"];

/// Predicate deciding whether a discovered source may be used.
pub type AcceptSource = Box<dyn Fn(&DiscoveredSource) -> bool + Send + Sync>;

/// Options for [`crate::Client::discover_source`].
pub struct DiscoverOptions {
    /// Prioritize Atom/RSS/JSON feeds over the WordPress REST API by
    /// reversing the strategy order.
    pub prefer_feeds: bool,
    /// Probe well-known paths when nothing can be auto-discovered.
    pub try_guess_paths: bool,
    /// Feed paths to probe; only used with `try_guess_paths`.
    pub feed_paths: Vec<String>,
    /// WordPress API paths to probe; only used with `try_guess_paths`.
    pub wp_api_paths: Vec<String>,
    /// Filters candidates; by default every source is acceptable.
    pub accept_source: Option<AcceptSource>,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            prefer_feeds: false,
            try_guess_paths: false,
            feed_paths: DEFAULT_FEED_PATHS.iter().map(|s| s.to_string()).collect(),
            wp_api_paths: DEFAULT_WP_API_PATHS.iter().map(|s| s.to_string()).collect(),
            accept_source: None,
        }
    }
}

impl DiscoverOptions {
    /// Sets the acceptance predicate.
    pub fn with_accept_source<F>(mut self, accept: F) -> Self
    where
        F: Fn(&DiscoveredSource) -> bool + Send + Sync + 'static,
    {
        self.accept_source = Some(Box::new(accept));
        self
    }

    pub(crate) fn accepts(&self, source: &DiscoveredSource) -> bool {
        match &self.accept_source {
            Some(accept) => accept(source),
            None => true,
        }
    }
}

impl fmt::Debug for DiscoverOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoverOptions")
            .field("prefer_feeds", &self.prefer_feeds)
            .field("try_guess_paths", &self.try_guess_paths)
            .field("feed_paths", &self.feed_paths)
            .field("wp_api_paths", &self.wp_api_paths)
            .field("accept_source", &self.accept_source.is_some())
            .finish()
    }
}

/// Options for [`crate::Client::fetch_post_list`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Synthesize missing plain-text variants from HTML contents.
    pub fill_text_contents: bool,
    /// WordPress-specific options, ignored for feed sources.
    pub wordpress: WordpressOptions,
}

/// WordPress REST API query shaping.
#[derive(Debug, Clone)]
pub struct WordpressOptions {
    /// Request pre-expanded author, taxonomy and featured-media resources.
    pub include_embedded: bool,
    /// Also fetch blog-level metadata from the API root.
    pub fetch_blog_info: bool,
    /// Amount of posts to list.
    pub limit: Option<u32>,
    /// Page number when the source does not carry one.
    pub page: Option<u32>,
    /// Filter by a search string.
    pub search: Option<String>,
    /// Only posts from these author ids.
    pub authors: Vec<u64>,
    /// Only posts from these category ids.
    pub categories: Vec<u64>,
    /// Only posts from these tag ids.
    pub tags: Vec<u64>,
    /// Extra query string parameters, passed through verbatim.
    pub additional_params: BTreeMap<String, String>,
}

impl Default for WordpressOptions {
    fn default() -> Self {
        Self {
            include_embedded: true,
            fetch_blog_info: false,
            limit: None,
            page: None,
            search: None,
            authors: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            additional_params: BTreeMap::new(),
        }
    }
}
