// ABOUTME: Mapper for RSS documents re-expressed as JSON, which have no schema of their own.
// ABOUTME: Values may be bare strings, objects carrying #value, or arrays where one element is expected.

use serde_json::Value;

use crate::authors::parse_rss_authors;
use crate::models::{
    Container, FeedKind, PostContent, PostItem, PostList, PostMedia, PostSource, PostTerm,
};
use crate::time_parse::parse_flexible_time;
use chrono::{DateTime, Utc};

/// Maps an RSS-in-JSON document (top-level `rss` field) into a post list.
///
/// Pagination is always left empty: the format has no standard mechanism
/// for it, even where Atom-style link relations could be expressed.
pub fn parse_rss_in_json_feed(json: &Value) -> PostList {
    let rss = json.get("rss");
    let version = rss.and_then(|rss| text_value(rss.get("version")));

    let mut list = PostList::new(Container::new(FeedKind::RssInJsonFeed, version));

    if let Some(channel) = rss.and_then(|rss| rss.get("channel")) {
        list.title = text_value(channel.get("title"));
        list.url = text_value(channel.get("link"));
        list.description = text_value(channel.get("description")).and_then(PostContent::html);
        list.copyright = text_value(channel.get("copyright"));
        list.updated_at = date_value(channel.get("lastBuildDate"));
        list.language = text_value(channel.get("language"));
        list.image = parse_images(channel.get("image"));
        list.posts = parse_posts(channel.get("item"));
    }

    list
}

fn parse_posts(items: Option<&Value>) -> Vec<PostItem> {
    array_value(items)
        .into_iter()
        .map(|item| {
            let author = text_value(item.get("author"));

            PostItem {
                guid: text_value(item.get("guid")),
                title: text_value(item.get("title")),
                link: text_value(item.get("link")),
                summary: text_value(item.get("description")).and_then(PostContent::html),
                published_at: date_value(item.get("pubDate")),
                authors: Some(parse_rss_authors(author.as_deref(), None)),
                categories: Some(parse_categories(item.get("category"))),
                media: Some(parse_media(item.get("enclosure"))),
                source: parse_source(item.get("source")),
                content: None,
                updated_at: None,
                tags: None,
            }
        })
        .collect()
}

fn parse_images(images: Option<&Value>) -> Vec<PostMedia> {
    array_value(images)
        .into_iter()
        .filter_map(|image| {
            let url = text_value(image.get("url"))?;
            let mut media = PostMedia::from_url(url);
            media.title = text_value(image.get("title"));
            media.width = number_value(image.get("width"));
            media.height = number_value(image.get("height"));
            Some(media)
        })
        .collect()
}

fn parse_categories(categories: Option<&Value>) -> Vec<PostTerm> {
    array_value(categories)
        .into_iter()
        .filter_map(|category| {
            let name = text_value(Some(category))?;
            Some(PostTerm {
                id: None,
                name: Some(name),
                url: None,
            })
        })
        .collect()
}

fn parse_media(enclosures: Option<&Value>) -> Vec<PostMedia> {
    array_value(enclosures)
        .into_iter()
        .filter_map(|enclosure| {
            let url = text_value(enclosure.get("url"))?;
            let mut media = PostMedia::from_url(url);
            media.length = number_value(enclosure.get("length"));
            media.media_type = text_value(enclosure.get("type"));
            Some(media)
        })
        .collect()
}

fn parse_source(source: Option<&Value>) -> Option<PostSource> {
    let source = source.filter(|value| !value.is_null())?;

    let title = text_value(Some(source));
    let url = text_value(source.get("url"));
    if title.is_none() && url.is_none() {
        return None;
    }

    Some(PostSource { url, title })
}

/// Gets the inner text of a property: prefer a nested `#value`, else a
/// direct string, else stringify a scalar. Empty strings count as absent.
fn text_value(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => return text_value(map.get("#value")),
        _ => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn date_value(value: Option<&Value>) -> Option<DateTime<Utc>> {
    text_value(value).and_then(|text| parse_flexible_time(&text))
}

fn number_value<T: std::str::FromStr>(value: Option<&Value>) -> Option<T> {
    text_value(value).and_then(|text| text.trim().parse().ok())
}

/// Wraps a naturally-singular property into a sequence: arrays pass
/// through, a bare value becomes a one-element sequence, null or absent
/// becomes empty.
fn array_value(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
    }
}
