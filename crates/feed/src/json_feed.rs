// ABOUTME: JSON Feed 1.0/1.1 mapper with typed deserialization.
// ABOUTME: See https://www.jsonfeed.org/version/1.1/ for the schema.

use serde::Deserialize;
use serde_json::json;

use crate::error::FeedError;
use crate::models::{
    Container, FeedKind, PostContent, PostItem, PostList, PostMedia, PostPerson, PostSource,
    PostTerm,
};
use crate::time_parse::parse_flexible_time;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonFeed {
    pub version: Option<String>,
    pub title: Option<String>,
    pub home_page_url: Option<String>,
    pub description: Option<String>,
    pub next_url: Option<String>,
    pub icon: Option<String>,
    pub favicon: Option<String>,
    /// JSON Feed 1.0 singular author, superseded by `authors`.
    pub author: Option<JsonFeedAuthor>,
    pub authors: Option<Vec<JsonFeedAuthor>>,
    pub language: Option<String>,
    #[serde(default)]
    pub items: Vec<JsonFeedItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonFeedAuthor {
    pub name: Option<String>,
    pub url: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonFeedItem {
    pub id: Option<String>,
    pub url: Option<String>,
    pub external_url: Option<String>,
    pub title: Option<String>,
    pub content_html: Option<String>,
    pub content_text: Option<String>,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub banner_image: Option<String>,
    pub date_published: Option<String>,
    pub date_modified: Option<String>,
    pub author: Option<JsonFeedAuthor>,
    pub authors: Option<Vec<JsonFeedAuthor>>,
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub attachments: Vec<JsonFeedAttachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonFeedAttachment {
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub title: Option<String>,
    pub size_in_bytes: Option<u64>,
}

/// Maps a JSON Feed document into a post list. The `next_url` is stored as
/// container metadata rather than resolved into a pagination source, since
/// the format of its target is unknown.
pub fn parse_json_feed(value: serde_json::Value) -> Result<PostList, FeedError> {
    let feed: JsonFeed = serde_json::from_value(value).map_err(FeedError::parse)?;

    let mut container = Container::new(FeedKind::JsonFeed, feed.version.clone());
    if let Some(next_url) = &feed.next_url {
        container.metadata = Some(json!({ "nextUrl": next_url }));
    }

    let feed_authors = parse_authors(feed.authors.as_deref(), feed.author.as_ref());

    let mut list = PostList::new(container);
    list.title = feed.title.clone();
    list.description = feed.description.clone().and_then(PostContent::text);
    list.url = feed.home_page_url.clone();
    list.language = feed.language.clone();
    list.image = parse_feed_images(&feed);
    list.posts = feed
        .items
        .iter()
        .map(|item| parse_item(item, feed_authors.as_deref()))
        .collect();

    Ok(list)
}

fn parse_item(item: &JsonFeedItem, feed_authors: Option<&[PostPerson]>) -> PostItem {
    PostItem {
        guid: item.id.clone(),
        title: item.title.clone(),
        link: item.url.clone(),
        content: PostContent::from_parts(item.content_html.clone(), item.content_text.clone()),
        summary: item.summary.clone().and_then(PostContent::text),
        source: item.external_url.clone().map(|url| PostSource {
            url: Some(url),
            title: None,
        }),
        authors: parse_authors(item.authors.as_deref(), item.author.as_ref())
            .or_else(|| feed_authors.map(<[_]>::to_vec)),
        media: Some(parse_item_media(item)),
        published_at: item
            .date_published
            .as_deref()
            .and_then(parse_flexible_time),
        updated_at: item.date_modified.as_deref().and_then(parse_flexible_time),
        categories: item.tags.as_ref().map(|tags| {
            tags.iter()
                .map(|tag| PostTerm {
                    id: None,
                    name: Some(tag.clone()),
                    url: None,
                })
                .collect()
        }),
        tags: None,
    }
}

/// Author precedence: the `authors` list if present, else the deprecated
/// singular `author` wrapped as a one-element list; `None` means the level
/// declares nothing and inheritance applies.
fn parse_authors(
    authors: Option<&[JsonFeedAuthor]>,
    author: Option<&JsonFeedAuthor>,
) -> Option<Vec<PostPerson>> {
    let singular;
    let authors = match (authors, author) {
        (Some(authors), _) => authors,
        (None, Some(author)) => {
            singular = [author.clone()];
            &singular[..]
        }
        (None, None) => return None,
    };

    Some(
        authors
            .iter()
            .map(|author| PostPerson {
                id: None,
                name: author.name.clone(),
                email: None,
                uri: author.url.clone(),
                images: author
                    .avatar
                    .clone()
                    .map(|avatar| vec![PostMedia::from_url(avatar)]),
            })
            .collect(),
    )
}

/// The feed `icon`, plus the `favicon` when it differs from the icon.
fn parse_feed_images(feed: &JsonFeed) -> Vec<PostMedia> {
    let mut images = Vec::new();

    if let Some(icon) = &feed.icon {
        let mut media = PostMedia::from_url(icon.clone());
        media.id = Some("icon".into());
        images.push(media);
    }

    if let Some(favicon) = &feed.favicon {
        if feed.icon.as_deref() != Some(favicon.as_str()) {
            let mut media = PostMedia::from_url(favicon.clone());
            media.id = Some("favicon".into());
            images.push(media);
        }
    }

    images
}

/// Item media: `image`, `banner_image` (when distinct from the image) and
/// every attachment carrying a URL.
fn parse_item_media(item: &JsonFeedItem) -> Vec<PostMedia> {
    let mut media = Vec::new();

    if let Some(image) = &item.image {
        let mut entry = PostMedia::from_url(image.clone());
        entry.id = Some("image".into());
        media.push(entry);
    }

    if let Some(banner) = &item.banner_image {
        if item.image.as_deref() != Some(banner.as_str()) {
            let mut entry = PostMedia::from_url(banner.clone());
            entry.id = Some("banner_image".into());
            media.push(entry);
        }
    }

    for attachment in &item.attachments {
        let url = match &attachment.url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => continue,
        };
        let mut entry = PostMedia::from_url(url);
        entry.media_type = attachment.mime_type.clone();
        entry.title = attachment.title.clone();
        entry.length = attachment.size_in_bytes;
        media.push(entry);
    }

    media
}
