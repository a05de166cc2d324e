// ABOUTME: Link classification shared by HTML discovery, Link headers and feed pagination.
// ABOUTME: Decides whether a hyperlink denotes a feed or a WordPress API and orders candidates by format preference.

use url::Url;

use crate::models::{DiscoveredSource, PostListPagination};

/// Canonical feed MIME types, in preference order: JSON Feed, then Atom,
/// then RSS. This ordering is how downstream discovery and pagination pick
/// one "best" link deterministically.
pub const FEED_MEDIA_TYPES: [&str; 3] = [
    "application/feed+json",
    "application/atom+xml",
    "application/rss+xml",
];

/// Generic container types accepted when the relation itself advertises a
/// feed.
pub const GENERIC_MEDIA_TYPES: [&str; 4] = [
    "application/json",
    "application/xml",
    "text/json",
    "text/xml",
];

/// The WordPress REST API discovery relation.
pub const WORDPRESS_API_REL: &str = "https://api.w.org/";

/// A hyperlink-like reference before classification: an HTML `<link>`, an
/// HTTP `Link` header entry or an `atom:link` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkCandidate {
    pub href: String,
    pub media_type: Option<String>,
    pub rel: Option<String>,
    pub title: Option<String>,
}

/// Classifies a set of link candidates into discovered sources.
///
/// WordPress API references (relation exactly [`WORDPRESS_API_REL`]) come
/// first, in input order. Feed references follow, stably sorted by the
/// position of their declared type in [`FEED_MEDIA_TYPES`]; unrecognized or
/// absent types sort after all recognized ones. Hrefs are resolved against
/// `base`; candidates that resolve to nothing or satisfy neither rule are
/// silently dropped.
pub fn classify_links(links: &[LinkCandidate], base: Option<&Url>) -> Vec<DiscoveredSource> {
    let mut wordpress = Vec::new();
    let mut feeds: Vec<(usize, DiscoveredSource)> = Vec::new();

    for link in links {
        if link.href.is_empty() {
            continue;
        }
        let url = match resolve_href(&link.href, base) {
            Some(url) => url,
            None => continue,
        };

        let media_type = link.media_type.as_deref().map(str::to_ascii_lowercase);
        let rel = link.rel.as_deref().map(str::to_ascii_lowercase);

        if rel.as_deref() == Some(WORDPRESS_API_REL) {
            wordpress.push(DiscoveredSource::WordpressApi { url, page: None });
            continue;
        }

        if !is_feed_link(media_type.as_deref(), rel.as_deref()) {
            continue;
        }

        let rank = type_preference(media_type.as_deref());
        feeds.push((
            rank,
            DiscoveredSource::Feed {
                url,
                media_type,
                title: link.title.clone(),
            },
        ));
    }

    // Stable sort keeps input order within each media-type bucket.
    feeds.sort_by_key(|(rank, _)| *rank);

    wordpress
        .into_iter()
        .chain(feeds.into_iter().map(|(_, source)| source))
        .collect()
}

/// Whether the type/rel pair denotes a feed: either a canonical feed MIME
/// type, or a relation containing "feed" with at most a generic container
/// type.
fn is_feed_link(media_type: Option<&str>, rel: Option<&str>) -> bool {
    if let Some(t) = media_type {
        if FEED_MEDIA_TYPES.contains(&t) {
            return true;
        }
    }

    if let Some(r) = rel {
        if r.contains("feed") {
            return match media_type {
                None => true,
                Some(t) => GENERIC_MEDIA_TYPES.contains(&t),
            };
        }
    }

    false
}

fn type_preference(media_type: Option<&str>) -> usize {
    media_type
        .and_then(|t| FEED_MEDIA_TYPES.iter().position(|valid| *valid == t))
        .unwrap_or(FEED_MEDIA_TYPES.len())
}

fn resolve_href(href: &str, base: Option<&Url>) -> Option<String> {
    match base {
        Some(base) => base.join(href).ok().map(String::from),
        None => Url::parse(href).ok().map(String::from),
    }
}

/// Derives page navigation from relation-typed links: for each of
/// `next`/`previous`/`first`/`last` (matched exactly), the best classified
/// feed among the links carrying that relation. The numeric pagination
/// fields stay absent for link-derived navigation.
pub fn resolve_pagination(links: &[LinkCandidate]) -> PostListPagination {
    PostListPagination {
        next: find_feed_link(links, "next"),
        previous: find_feed_link(links, "previous"),
        first: find_feed_link(links, "first"),
        last: find_feed_link(links, "last"),
        ..Default::default()
    }
}

fn find_feed_link(links: &[LinkCandidate], rel: &str) -> Option<DiscoveredSource> {
    let matching: Vec<LinkCandidate> = links
        .iter()
        .filter(|link| link.rel.as_deref() == Some(rel))
        .cloned()
        .collect();

    classify_links(&matching, None).into_iter().next()
}
