// ABOUTME: Discovery orchestrator: header hint, HTML metadata and guessed-path probing in a strict order.
// ABOUTME: The first strategy yielding an accepted source short-circuits the rest; probe failures are swallowed.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use postscout_feed::{classify_links, parse_raw_feed, DiscoveredSource, LinkCandidate};

use crate::error::ClientError;
use crate::options::DiscoverOptions;
use crate::transport::{self, Response};

/// Accept list sent with feed requests and probes.
pub(crate) const FEED_ACCEPT: &str = "application/xml, application/rss+xml, application/atom+xml, application/feed+json, application/json";

pub(crate) const JSON_ACCEPT: &str = "application/json";

/// Auto-discovery examines at most this many `<link>` elements.
const MAX_HTML_LINKS: usize = 100;

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("link").expect("link selector"));
static BASE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("base").expect("base selector"));

enum Strategy {
    LinkHeader,
    HtmlMetadata,
    GuessWordpressPaths,
    GuessFeedPaths,
}

/// Looks through a site's response headers, HTML metadata and optionally a
/// set of well-known paths to find a post source.
pub(crate) async fn discover_source(
    http: &reqwest::Client,
    site_url: &str,
    options: &DiscoverOptions,
) -> Result<DiscoveredSource, ClientError> {
    let response = transport::fetch_text(http, site_url, None).await?;
    if response.is_error_status() {
        return Err(ClientError::Status {
            status: response.status,
            url: site_url.to_string(),
        });
    }

    let mut strategies = vec![Strategy::LinkHeader, Strategy::HtmlMetadata];
    if options.prefer_feeds {
        strategies.reverse();
    }
    if options.try_guess_paths {
        if options.prefer_feeds {
            strategies.push(Strategy::GuessFeedPaths);
            strategies.push(Strategy::GuessWordpressPaths);
        } else {
            strategies.push(Strategy::GuessWordpressPaths);
            strategies.push(Strategy::GuessFeedPaths);
        }
    }

    for strategy in strategies {
        let (name, sources) = match strategy {
            Strategy::LinkHeader => ("link-header", wordpress_from_link_header(&response)),
            Strategy::HtmlMetadata => ("html-metadata", discover_from_html(site_url, &response.body)),
            Strategy::GuessWordpressPaths => (
                "guess-wp-paths",
                probe_wordpress_paths(http, site_url, &options.wp_api_paths).await,
            ),
            Strategy::GuessFeedPaths => (
                "guess-feed-paths",
                probe_feed_paths(http, site_url, &options.feed_paths).await,
            ),
        };
        debug!(strategy = name, candidates = sources.len(), "discovery step");

        if let Some(source) = sources.into_iter().find(|source| options.accepts(source)) {
            return Ok(source);
        }
    }

    Err(ClientError::NoSourceFound {
        url: site_url.to_string(),
    })
}

/// The WordPress discovery hint from the HTTP `Link` header.
fn wordpress_from_link_header(response: &Response) -> Vec<DiscoveredSource> {
    let base = Url::parse(&response.final_url).ok();

    let mut candidates = Vec::new();
    for value in response.headers.get_all("link") {
        if let Ok(value) = value.to_str() {
            candidates.extend(parse_link_header(value));
        }
    }

    classify_links(&candidates, base.as_ref())
        .into_iter()
        .filter(|source| matches!(source, DiscoveredSource::WordpressApi { .. }))
        .collect()
}

/// Parses an HTTP `Link` header value into link candidates.
fn parse_link_header(value: &str) -> Vec<LinkCandidate> {
    value
        .split(',')
        .filter_map(|part| {
            let part = part.trim();
            let start = part.find('<')?;
            let end = part.find('>')?;
            let mut candidate = LinkCandidate {
                href: part.get(start + 1..end)?.to_string(),
                ..Default::default()
            };

            for param in part.get(end + 1..)?.split(';') {
                let (key, param_value) = match param.split_once('=') {
                    Some(pair) => pair,
                    None => continue,
                };
                let param_value = param_value.trim().trim_matches('"').to_string();
                match key.trim().to_ascii_lowercase().as_str() {
                    "rel" => candidate.rel = Some(param_value),
                    "type" => candidate.media_type = Some(param_value),
                    "title" => candidate.title = Some(param_value),
                    _ => {}
                }
            }

            Some(candidate)
        })
        .collect()
}

/// Feed and API auto-discovery from the page's `<link>` elements, per the
/// RSS and JSON Feed discovery conventions. Relative hrefs resolve against
/// the document `<base>` (itself resolved against the page URL).
fn discover_from_html(page_url: &str, html: &str) -> Vec<DiscoveredSource> {
    let document = Html::parse_document(html);

    let page = Url::parse(page_url).ok();
    let base_url = document
        .select(&BASE_SELECTOR)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| page.as_ref().and_then(|page| page.join(href).ok()))
        .or(page);

    let candidates: Vec<LinkCandidate> = document
        .select(&LINK_SELECTOR)
        .take(MAX_HTML_LINKS)
        .map(|link| LinkCandidate {
            href: link.value().attr("href").unwrap_or_default().to_string(),
            media_type: link.value().attr("type").map(str::to_string),
            rel: link.value().attr("rel").map(str::to_string),
            title: link.value().attr("title").map(str::to_string),
        })
        .collect();

    classify_links(&candidates, base_url.as_ref())
}

/// Probes candidate feed paths concurrently; a path counts only when its
/// response parses as a feed. Individual probe failures contribute nothing.
async fn probe_feed_paths(
    http: &reqwest::Client,
    base_url: &str,
    paths: &[String],
) -> Vec<DiscoveredSource> {
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(_) => return Vec::new(),
    };

    let probes = paths
        .iter()
        .filter_map(|path| base.join(path).ok())
        .map(|url| probe_feed_path(http, url));

    futures::future::join_all(probes)
        .await
        .into_iter()
        .flatten()
        .collect()
}

async fn probe_feed_path(http: &reqwest::Client, url: Url) -> Option<DiscoveredSource> {
    let response = transport::fetch_text(http, url.as_str(), Some(FEED_ACCEPT))
        .await
        .ok()?;
    if response.is_error_status() || response.body.is_empty() {
        return None;
    }

    let list = match parse_raw_feed(&response.body, response.content_type.as_deref()) {
        Ok(list) => list,
        Err(err) => {
            debug!(url = %url, error = %err, "probed path is not a feed");
            return None;
        }
    };

    Some(DiscoveredSource::Feed {
        url: response.final_url,
        media_type: response.content_type,
        title: list.title,
    })
}

/// Probes candidate WordPress API root paths concurrently; a path counts
/// when it answers JSON carrying a site name.
async fn probe_wordpress_paths(
    http: &reqwest::Client,
    base_url: &str,
    paths: &[String],
) -> Vec<DiscoveredSource> {
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(_) => return Vec::new(),
    };

    let probes = paths
        .iter()
        .filter_map(|path| base.join(path).ok())
        .map(|url| probe_wordpress_path(http, url));

    futures::future::join_all(probes)
        .await
        .into_iter()
        .flatten()
        .collect()
}

async fn probe_wordpress_path(http: &reqwest::Client, url: Url) -> Option<DiscoveredSource> {
    let response = transport::fetch_text(http, url.as_str(), Some(JSON_ACCEPT))
        .await
        .ok()?;
    if response.is_error_status() {
        return None;
    }

    let value: serde_json::Value = serde_json::from_str(&response.body).ok()?;
    let name = value.get("name").and_then(|name| name.as_str())?;
    if name.is_empty() {
        return None;
    }

    Some(DiscoveredSource::WordpressApi {
        url: response.final_url,
        page: None,
    })
}
