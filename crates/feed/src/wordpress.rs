// ABOUTME: WordPress REST API types and the collection mapper into the canonical schema.
// ABOUTME: Resolves embedded authors, taxonomy terms and featured media; pagination comes from response metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::html_text::html_to_text;
use crate::models::{
    DiscoveredSource, PostContent, PostItem, PostList, PostListPagination, PostMedia, PostPerson,
    PostTerm,
};
use crate::time_parse::parse_flexible_time;

/// A field rendered to HTML by WordPress.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpRendered {
    pub rendered: Option<String>,
}

/// A post resource from `/wp/v2/posts`, optionally pre-expanded with
/// embedded related resources.
#[derive(Debug, Clone, Deserialize)]
pub struct WpPost {
    pub id: Option<u64>,
    pub guid: Option<WpRendered>,
    pub title: Option<WpRendered>,
    pub content: Option<WpRendered>,
    pub excerpt: Option<WpRendered>,
    pub author: Option<u64>,
    pub link: Option<String>,
    pub date: Option<String>,
    pub date_gmt: Option<String>,
    pub modified: Option<String>,
    pub modified_gmt: Option<String>,
    pub categories: Option<Vec<u64>>,
    pub tags: Option<Vec<u64>>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<WpEmbedded>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpEmbedded {
    pub author: Option<Vec<WpAuthor>>,
    #[serde(rename = "wp:featuredmedia")]
    pub featured_media: Option<Vec<WpMedia>>,
    #[serde(rename = "wp:term")]
    pub terms: Option<Vec<Vec<WpTerm>>>,
}

/// An embedded user resource. Unauthorized expansions come back as error
/// envelopes in the same list, so the error fields ride along here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpAuthor {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub link: Option<String>,
    #[serde(default)]
    pub avatar_urls: BTreeMap<String, String>,
    pub code: Option<String>,
    pub data: Option<WpErrorData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpErrorData {
    pub status: Option<u16>,
}

impl WpAuthor {
    /// Whether this entry is a WP error envelope rather than a user.
    pub fn is_error_envelope(&self) -> bool {
        self.code.is_some() && self.data.as_ref().and_then(|data| data.status).is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpTerm {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub link: Option<String>,
    pub taxonomy: Option<String>,
}

/// An embedded media resource from `/wp/v2/media`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpMedia {
    pub id: Option<u64>,
    pub title: Option<WpRendered>,
    pub source_url: Option<String>,
    pub mime_type: Option<String>,
    pub media_details: Option<WpMediaDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpMediaDetails {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sizes: Option<BTreeMap<String, WpMediaSize>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpMediaSize {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mime_type: Option<String>,
    pub source_url: Option<String>,
}

/// The API root resource, used for blog-level metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpBlogInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub home: Option<String>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<WpBlogEmbedded>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WpBlogEmbedded {
    #[serde(rename = "wp:featuredmedia")]
    pub featured_media: Option<Vec<WpMedia>>,
}

// The REST API emits local dates without a timezone marker
// (https://core.trac.wordpress.org/ticket/41032); such strings get an
// explicit UTC marker appended before parsing.
static NAIVE_WP_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}$").expect("date pattern")
});

/// Parses a WordPress datetime string into an instant.
pub fn parse_wordpress_datetime(date: Option<&str>) -> Option<DateTime<Utc>> {
    let date = date?;
    if NAIVE_WP_DATE.is_match(date) {
        return parse_flexible_time(&format!("{date}Z"));
    }
    parse_flexible_time(date)
}

/// Maps a collection of post resources into canonical post items.
pub fn parse_wordpress_posts(posts: &[WpPost]) -> Vec<PostItem> {
    posts
        .iter()
        .map(|post| PostItem {
            guid: decoded_text(post.guid.as_ref()),
            title: decoded_text(post.title.as_ref()),
            link: post.link.clone(),
            content: rendered_html(post.content.as_ref()),
            summary: rendered_html(post.excerpt.as_ref()),
            authors: Some(parse_wordpress_authors(post)),
            categories: Some(parse_wordpress_terms(post, post.categories.as_deref(), "category")),
            tags: Some(parse_wordpress_terms(post, post.tags.as_deref(), "post_tag")),
            media: parse_featured_media(post),
            published_at: parse_wordpress_datetime(post.date_gmt.as_deref().or(post.date.as_deref())),
            updated_at: parse_wordpress_datetime(
                post.modified_gmt.as_deref().or(post.modified.as_deref()),
            ),
            source: None,
        })
        .collect()
}

/// `guid.rendered` and `title.rendered` are HTML; decode them to plain text.
fn decoded_text(field: Option<&WpRendered>) -> Option<String> {
    let rendered = field?.rendered.as_deref()?;
    let text = html_to_text(rendered);
    (!text.is_empty()).then_some(text)
}

/// `content.rendered` and `excerpt.rendered` stay HTML, verbatim.
fn rendered_html(field: Option<&WpRendered>) -> Option<PostContent> {
    PostContent::from_parts(field.and_then(|f| f.rendered.clone()), None)
}

/// Resolves numeric taxonomy ids against the embedded term groups: a match
/// requires both the id and the expected taxonomy label. Unmatched ids
/// still yield a term carrying only the id.
fn parse_wordpress_terms(post: &WpPost, ids: Option<&[u64]>, taxonomy: &str) -> Vec<PostTerm> {
    let ids = match ids {
        Some(ids) => ids,
        None => return Vec::new(),
    };
    let groups = post
        .embedded
        .as_ref()
        .and_then(|embedded| embedded.terms.as_deref())
        .unwrap_or(&[]);

    ids.iter()
        .map(|&id| {
            let term = groups.iter().flatten().find(|term| {
                term.id == Some(id) && term.taxonomy.as_deref() == Some(taxonomy)
            });

            PostTerm {
                id: Some(id.into()),
                name: term
                    .and_then(|term| term.name.as_deref())
                    .map(html_to_text)
                    .filter(|name| !name.is_empty()),
                url: term.and_then(|term| term.link.clone()),
            }
        })
        .collect()
}

/// Uses the embedded author resources when present (skipping error
/// envelopes), else falls back to a single person carrying only the
/// numeric author id.
fn parse_wordpress_authors(post: &WpPost) -> Vec<PostPerson> {
    let embedded = post
        .embedded
        .as_ref()
        .and_then(|embedded| embedded.author.as_deref());

    match embedded {
        Some(authors) => authors
            .iter()
            .filter(|author| !author.is_error_envelope())
            .map(|author| PostPerson {
                id: author.id.map(Into::into),
                name: author.name.clone(),
                email: None,
                uri: author.link.clone(),
                images: Some(parse_avatar_urls(&author.avatar_urls)),
            })
            .collect(),
        None => vec![PostPerson {
            id: post.author.map(Into::into),
            ..Default::default()
        }],
    }
}

/// Avatar variants are keyed by pixel size; the key becomes both
/// dimensions of the image entry.
fn parse_avatar_urls(avatar_urls: &BTreeMap<String, String>) -> Vec<PostMedia> {
    avatar_urls
        .iter()
        .filter(|(_, url)| !url.is_empty())
        .map(|(size, url)| {
            let pixels: Option<u32> = size.trim().parse().ok();
            let mut media = PostMedia::from_url(url.clone());
            media.width = pixels;
            media.height = pixels;
            media
        })
        .collect()
}

fn parse_featured_media(post: &WpPost) -> Option<Vec<PostMedia>> {
    let items = post
        .embedded
        .as_ref()
        .and_then(|embedded| embedded.featured_media.as_deref())?;
    Some(parse_wordpress_media(items))
}

/// Maps media resources. A resource exposing registered size variants
/// yields one entry per variant (each with its own URL, type and
/// dimensions, all sharing the resource title); otherwise the resource's
/// direct fields yield a single entry.
pub fn parse_wordpress_media(items: &[WpMedia]) -> Vec<PostMedia> {
    let mut media = Vec::new();

    for item in items {
        let title = decoded_text(item.title.as_ref());
        let sizes = item
            .media_details
            .as_ref()
            .and_then(|details| details.sizes.as_ref())
            .filter(|sizes| !sizes.is_empty());

        match sizes {
            Some(sizes) => {
                for size in sizes.values() {
                    let url = match size.source_url.as_deref() {
                        Some(url) if !url.is_empty() => url,
                        _ => continue,
                    };
                    let mut entry = PostMedia::from_url(url);
                    entry.id = item.id.map(Into::into);
                    entry.media_type = size.mime_type.clone();
                    entry.width = size.width;
                    entry.height = size.height;
                    entry.title = title.clone();
                    media.push(entry);
                }
            }
            None => {
                let url = match item.source_url.as_deref() {
                    Some(url) if !url.is_empty() => url,
                    _ => continue,
                };
                let mut entry = PostMedia::from_url(url);
                entry.id = item.id.map(Into::into);
                entry.media_type = item.mime_type.clone();
                entry.width = item.media_details.as_ref().and_then(|details| details.width);
                entry.height = item
                    .media_details
                    .as_ref()
                    .and_then(|details| details.height);
                entry.title = title;
                media.push(entry);
            }
        }
    }

    media
}

/// Computes pagination for a page of a WordPress collection from the
/// request page number and the `x-wp-totalpages`/`x-wp-total` response
/// metadata. `first` is always page 1 and `last` always the total page
/// count, even when either equals the current page.
pub fn parse_wordpress_pagination(
    wp_api_base: &str,
    current_page: u32,
    total_pages: Option<u32>,
    total_posts: Option<u64>,
) -> PostListPagination {
    let page_source = |page: u32| DiscoveredSource::WordpressApi {
        url: wp_api_base.to_string(),
        page: Some(page),
    };

    PostListPagination {
        current_page: Some(current_page),
        total_pages,
        total_posts,
        next: total_pages
            .filter(|&total| current_page < total)
            .map(|_| page_source(current_page + 1)),
        previous: (current_page > 1).then(|| page_source(current_page - 1)),
        first: Some(page_source(1)),
        last: total_pages.map(page_source),
    }
}

/// Applies blog-level metadata from the API root onto a post list.
pub fn apply_blog_info(list: &mut PostList, info: &WpBlogInfo) {
    list.title = info.name.clone().filter(|name| !name.is_empty());
    list.url = info
        .home
        .clone()
        .filter(|home| !home.is_empty())
        .or_else(|| info.url.clone());
    list.description = info.description.clone().and_then(PostContent::text);
    list.image = info
        .embedded
        .as_ref()
        .and_then(|embedded| embedded.featured_media.as_deref())
        .map(parse_wordpress_media)
        .unwrap_or_default();
}
