// ABOUTME: Format sniffing and routing: decides JSON vs XML shape and hands off to the right mapper.
// ABOUTME: Unwraps JSONP padding and locates the XML root element; classification failures are fatal.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::atom::parse_atom_feed;
use crate::error::FeedError;
use crate::json_feed::parse_json_feed;
use crate::models::PostList;
use crate::rss::parse_rss_feed;
use crate::rss_json::parse_rss_in_json_feed;
use crate::xml_tree;

/// XML elements that can anchor a feed document.
const ROOT_TAGS: [&str; 3] = ["rss", "feed", "rdf:rdf"];

/// The JSON Feed specification namespace referenced by its `version` field.
const JSON_FEED_NAMESPACE: &str = "jsonfeed.org";

// Matches a JSONP wrapper such as `onGetFeed({ ... })`.
static JSONP_WRAPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(\w+)\s*\(\s*(\{.*\})\s*\)$").expect("jsonp pattern"));

/// Parses a raw feed payload into the canonical post list.
///
/// The payload is treated as JSON-shaped when the declared type contains
/// "json", or when no type was declared and the trimmed text is brace
/// delimited. It is treated as XML-shaped when the declared type contains
/// "xml" or the text carries an XML declaration or an `xmlns` attribute.
/// Anything else is an unrecognized format.
pub fn parse_raw_feed(raw: &str, media_type: Option<&str>) -> Result<PostList, FeedError> {
    let declared = media_type.map(str::to_ascii_lowercase);
    let trimmed = raw.trim();

    let might_be_json = declared.as_deref().is_some_and(|t| t.contains("json"))
        || (declared.is_none() && trimmed.starts_with('{') && trimmed.ends_with('}'));
    if might_be_json {
        return parse_raw_json_feed(trimmed);
    }

    let might_be_xml = declared.as_deref().is_some_and(|t| t.contains("xml"))
        || raw.contains("<?xml")
        || raw.contains("xmlns");
    if might_be_xml {
        return parse_raw_xml_feed(raw);
    }

    Err(FeedError::UnrecognizedFormat)
}

/// Parses a JSON-shaped payload, routing by schema: a `version` referencing
/// the JSON Feed namespace goes to the JSON Feed mapper, a top-level `rss`
/// field to the RSS-in-JSON mapper.
fn parse_raw_json_feed(raw: &str) -> Result<PostList, FeedError> {
    let json = strip_jsonp(raw);
    let value: serde_json::Value = serde_json::from_str(json).map_err(FeedError::parse)?;

    let is_json_feed = value
        .get("version")
        .and_then(|v| v.as_str())
        .is_some_and(|v| v.contains(JSON_FEED_NAMESPACE));
    if is_json_feed {
        return parse_json_feed(value);
    }

    if value.get("rss").is_some() {
        return Ok(parse_rss_in_json_feed(&value));
    }

    Err(FeedError::UnidentifiableFeed)
}

/// Parses an XML-shaped payload, locating the first `rss`, `feed` or
/// `rdf:RDF` element (case-insensitive, depth-first through the whole
/// tree) and dispatching on it.
fn parse_raw_xml_feed(raw: &str) -> Result<PostList, FeedError> {
    let document = xml_tree::parse(raw)?;

    let roots = document.find_matching(
        &|name| ROOT_TAGS.contains(&name.to_ascii_lowercase().as_str()),
        true,
    );
    let root = roots.first().ok_or(FeedError::RootNotFound)?;

    if root.name.eq_ignore_ascii_case("feed") {
        Ok(parse_atom_feed(root))
    } else {
        Ok(parse_rss_feed(root))
    }
}

/// Strips a JSONP-style function-call wrapper; text without one is used
/// unmodified.
fn strip_jsonp(raw: &str) -> &str {
    match JSONP_WRAPPER.captures(raw) {
        Some(parts) => parts.get(2).map(|m| m.as_str()).unwrap_or(raw),
        None => raw,
    }
}
