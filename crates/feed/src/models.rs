// ABOUTME: Canonical data model for normalized post lists and discovered sources.
// ABOUTME: All entities are immutable value objects produced once per discovery or fetch call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies where and how to fetch a post list.
///
/// Produced by discovery or pagination resolution, consumed by fetch. The
/// variant set is fixed: a syndication feed document or a WordPress REST
/// collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source")]
pub enum DiscoveredSource {
    /// An Atom, RSS or JSON Feed document.
    #[serde(rename = "feed")]
    Feed {
        /// The feed URL.
        url: String,
        /// The declared feed MIME type, when one was advertised.
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        media_type: Option<String>,
        /// The feed title, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    /// A WordPress REST API collection.
    #[serde(rename = "wordpress-rest-api")]
    WordpressApi {
        /// The WP API base URL.
        url: String,
        /// The page number to fetch.
        #[serde(skip_serializing_if = "Option::is_none")]
        page: Option<u32>,
    },
}

impl DiscoveredSource {
    /// The URL of the underlying feed or API endpoint.
    pub fn url(&self) -> &str {
        match self {
            DiscoveredSource::Feed { url, .. } => url,
            DiscoveredSource::WordpressApi { url, .. } => url,
        }
    }
}

/// The container format a post list was normalized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedKind {
    AtomFeed,
    RssFeed,
    JsonFeed,
    RssInJsonFeed,
    WordpressRestApi,
}

/// Container metadata of a post list: the source format, its version when
/// the document declares one, and opaque per-format metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    #[serde(rename = "type")]
    pub kind: FeedKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Container {
    pub fn new(kind: FeedKind, version: Option<String>) -> Self {
        Self {
            kind,
            version,
            metadata: None,
        }
    }
}

/// The canonical normalized feed: list-level metadata plus its posts, in
/// document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostList {
    pub container: Container,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<PostContent>,
    /// The site URL, not the feed URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Site-level media (channel image, icon, logo, favicon).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image: Vec<PostMedia>,
    pub posts: Vec<PostItem>,
    #[serde(default)]
    pub pagination: PostListPagination,
}

impl PostList {
    /// A list with only the container set; mappers fill in the rest.
    pub fn new(container: Container) -> Self {
        Self {
            container,
            title: None,
            description: None,
            url: None,
            language: None,
            copyright: None,
            updated_at: None,
            image: Vec::new(),
            posts: Vec::new(),
            pagination: PostListPagination::default(),
        }
    }
}

/// Navigation between pages of a post list.
///
/// XML-based formats populate only the rel-derived sources; the numeric
/// fields are computable only for WordPress collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListPagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<DiscoveredSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<DiscoveredSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<DiscoveredSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<DiscoveredSource>,
    /// The current page number, starting at 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_posts: Option<u64>,
}

/// One entry of a post list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostItem {
    /// Stable identity: `id` (Atom, JSON Feed) or `guid` (RSS, WP API).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The item permalink.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Absent means unknown; an empty list means explicitly no authors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<PostPerson>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<PostTerm>>,
    /// Only WordPress distinguishes tags from categories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<PostTerm>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<PostContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PostContent>,
    /// Attachments, enclosures and images, in document order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<PostMedia>>,
    /// Original-publication backlink, distinct from `link`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PostSource>,
}

/// A body in HTML and/or plain-text form. Never constructed with both
/// halves absent; `text` is only synthesized from `html` by the
/// HTML-to-text helper, never fabricated by a parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl PostContent {
    /// Builds a content value, treating empty strings as absent. Returns
    /// `None` when neither half carries anything.
    pub fn from_parts(html: Option<String>, text: Option<String>) -> Option<Self> {
        let html = html.filter(|s| !s.is_empty());
        let text = text.filter(|s| !s.is_empty());
        if html.is_none() && text.is_none() {
            return None;
        }
        Some(Self { html, text })
    }

    pub fn html(html: impl Into<String>) -> Option<Self> {
        Self::from_parts(Some(html.into()), None)
    }

    pub fn text(text: impl Into<String>) -> Option<Self> {
        Self::from_parts(None, Some(text.into()))
    }
}

/// An identifier that a source may express as a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(u64),
    Text(String),
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        EntityId::Number(n)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(s.to_string())
    }
}

/// A media object: attachment, enclosure or image. `url` is always
/// non-empty; entries without a resolvable URL are dropped during mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMedia {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub url: String,
    /// File size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    /// MIME type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Title or alt text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl PostMedia {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            id: None,
            url: url.into(),
            length: None,
            media_type: None,
            title: None,
            width: None,
            height: None,
        }
    }
}

/// A person: author or contributor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPerson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Profile, website or `mailto:` link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Profile images (avatars).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<PostMedia>>,
}

/// A taxonomy term: category or tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostTerm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// An original-publication reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
