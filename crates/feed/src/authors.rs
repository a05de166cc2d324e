// ABOUTME: Shared author-string parsing for RSS-style author and dc:creator values.
// ABOUTME: One utility for both the XML and the JSON renditions of RSS, so the heuristics cannot drift.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::PostPerson;

// Matches "Jane Doe (https://jane.example)" style values: a lazily-matched
// head plus an optional trailing parenthesized part.
static AUTHOR_PARTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)(?:\s?\((.+)\))?$").expect("author pattern"));

/// Parses the `author` and `dc:creator` strings of an RSS item into the
/// canonical author list.
///
/// A `dc:creator` value of the form `name (uri)` splits into name and uri,
/// otherwise the whole string is the name. An `author` value of the form
/// `email (name)` splits into email and name, otherwise the whole string is
/// the email. A uri starting with `mailto:` backfills the email when none
/// was found. Both inputs absent yields an explicitly empty list; either
/// present yields exactly one person.
pub fn parse_rss_authors(author: Option<&str>, creator: Option<&str>) -> Vec<PostPerson> {
    let mut name: Option<String> = None;
    let mut uri: Option<String> = None;
    let mut email: Option<String> = None;

    if let Some(creator) = non_empty(creator) {
        match AUTHOR_PARTS.captures(creator) {
            Some(parts) => {
                name = Some(parts[1].to_string());
                uri = parts.get(2).map(|m| m.as_str().to_string());
            }
            None => name = Some(creator.to_string()),
        }
    }

    if let Some(author) = non_empty(author) {
        match AUTHOR_PARTS.captures(author) {
            Some(parts) => {
                // The parenthesized name, when present, wins over dc:creator.
                name = parts.get(2).map(|m| m.as_str().to_string());
                email = Some(parts[1].to_string());
            }
            None => email = Some(author.to_string()),
        }
    }

    if email.is_none() {
        if let Some(rest) = uri.as_deref().and_then(|u| u.strip_prefix("mailto:")) {
            email = Some(rest.to_string());
        }
    }

    if name.is_none() && uri.is_none() && email.is_none() {
        return Vec::new();
    }

    vec![PostPerson {
        id: None,
        name,
        email,
        uri,
        images: None,
    }]
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_creator_with_uri() {
        let authors = parse_rss_authors(None, Some("Jane Doe (https://jane.example)"));
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].name.as_deref(), Some("Jane Doe"));
        assert_eq!(authors[0].uri.as_deref(), Some("https://jane.example"));
        assert_eq!(authors[0].email, None);
    }

    #[test]
    fn test_creator_plain_name() {
        let authors = parse_rss_authors(None, Some("Jane Doe"));
        assert_eq!(authors[0].name.as_deref(), Some("Jane Doe"));
        assert_eq!(authors[0].uri, None);
    }

    #[test]
    fn test_author_with_name() {
        let authors = parse_rss_authors(Some("jane@example.com (Jane Doe)"), None);
        assert_eq!(authors[0].email.as_deref(), Some("jane@example.com"));
        assert_eq!(authors[0].name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_author_plain_email() {
        let authors = parse_rss_authors(Some("jane@example.com"), None);
        assert_eq!(authors[0].email.as_deref(), Some("jane@example.com"));
        assert_eq!(authors[0].name, None);
    }

    #[test]
    fn test_mailto_uri_becomes_email() {
        let authors = parse_rss_authors(None, Some("Jane Doe (mailto:jane@example.com)"));
        assert_eq!(authors[0].name.as_deref(), Some("Jane Doe"));
        assert_eq!(authors[0].uri.as_deref(), Some("mailto:jane@example.com"));
        assert_eq!(authors[0].email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_both_absent_is_empty_list() {
        assert_eq!(parse_rss_authors(None, None), Vec::new());
        assert_eq!(parse_rss_authors(Some(""), Some("")), Vec::new());
    }

    #[test]
    fn test_author_overrides_creator_name() {
        // The author string also matched, so its (absent) name part replaces
        // the creator-derived name.
        let authors = parse_rss_authors(Some("jane@example.com"), Some("Jane Doe"));
        assert_eq!(authors[0].email.as_deref(), Some("jane@example.com"));
        assert_eq!(authors[0].name, None);
    }
}
