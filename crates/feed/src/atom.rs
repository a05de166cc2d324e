// ABOUTME: Atom 1.0 mapper: feed and entry elements into the canonical post list.
// ABOUTME: See RFC 4287 for the element vocabulary.

use crate::links::{resolve_pagination, LinkCandidate};
use crate::models::{
    Container, FeedKind, PostContent, PostItem, PostList, PostMedia, PostPerson, PostSource,
    PostTerm,
};
use crate::xml_tree::Element;

const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Maps a parsed `<feed>` element into a post list.
pub fn parse_atom_feed(atom: &Element) -> PostList {
    let version = (atom.attr("xmlns") == Some(ATOM_NAMESPACE)).then(|| "1.0".to_string());
    let mut list = PostList::new(Container::new(FeedKind::AtomFeed, version));

    let links = atom.find_all("link", false);

    list.pagination = resolve_pagination(&link_candidates(&links));
    list.title = atom.text_of("title", false);
    list.description = parse_atom_content(&atom.find_all("subtitle", false));
    list.copyright = atom.text_of("rights", false);
    list.updated_at = atom.date_of("updated", false);
    list.url = atom_link_url(&links);
    list.language = atom.attr("xml:lang").map(str::to_string);
    list.image = atom
        .find_matching(&|name| name == "icon" || name == "logo", false)
        .into_iter()
        .filter_map(|element| {
            let url = element.text_content();
            (!url.is_empty()).then(|| PostMedia::from_url(url))
        })
        .collect();
    list.posts = parse_atom_entries(atom);

    list
}

fn parse_atom_entries(atom: &Element) -> Vec<PostItem> {
    atom.find_all("entry", true)
        .into_iter()
        .map(|entry| {
            let links = entry.find_all("link", true);
            let contents = entry.find_all("content", true);
            let updated_at = entry.date_of("updated", true);

            PostItem {
                guid: entry.text_of("id", true),
                title: entry.text_of("title", true),
                link: atom_link_url(&links),
                authors: Some(parse_atom_authors(&entry.find_all("author", true))),
                published_at: entry.date_of("published", true).or(updated_at),
                updated_at,
                content: parse_atom_content(&contents),
                summary: parse_atom_content(&entry.find_all("summary", true)),
                media: Some(parse_atom_media(&contents)),
                source: parse_atom_source(entry.find_first("source", true)),
                categories: Some(parse_atom_categories(&entry.find_all("category", true))),
                tags: None,
            }
        })
        .collect()
}

/// Maps `<category>` elements; `label` wins over `term`, entries lacking
/// both are dropped.
fn parse_atom_categories(categories: &[&Element]) -> Vec<PostTerm> {
    categories
        .iter()
        .filter_map(|category| {
            let name = category
                .attr("label")
                .or_else(|| category.attr("term"))
                .filter(|name| !name.is_empty())?;
            Some(PostTerm {
                id: None,
                name: Some(name.to_string()),
                url: None,
            })
        })
        .collect()
}

/// Maps `<author>` person constructs 1:1.
fn parse_atom_authors(authors: &[&Element]) -> Vec<PostPerson> {
    authors
        .iter()
        .map(|author| PostPerson {
            id: None,
            name: author.text_of("name", true),
            email: author.text_of("email", true),
            uri: author.text_of("uri", true),
            images: None,
        })
        .collect()
}

/// Combines `<content>`, `<summary>` or `<subtitle>` variants into one body:
/// the `type="html"` variant supplies the HTML half, the `type="text"` (or
/// untyped) variant the text half. Both may coexist.
fn parse_atom_content(contents: &[&Element]) -> Option<PostContent> {
    let html = contents
        .iter()
        .find(|element| element.attr("type") == Some("html"))
        .map(|element| element.text_content());
    let text = contents
        .iter()
        .find(|element| matches!(element.attr("type"), Some("text") | None))
        .map(|element| element.text_content());

    PostContent::from_parts(html, text)
}

/// Media comes only from `<content>` elements carrying a `src` attribute.
fn parse_atom_media(contents: &[&Element]) -> Vec<PostMedia> {
    contents
        .iter()
        .filter_map(|element| {
            let src = element.attr("src").filter(|src| !src.is_empty())?;
            let mut media = PostMedia::from_url(src);
            media.media_type = element.attr("type").map(str::to_string);
            Some(media)
        })
        .collect()
}

fn parse_atom_source(source: Option<&Element>) -> Option<PostSource> {
    let source = source?;
    let links = source.find_all("link", true);

    Some(PostSource {
        title: source.text_of("title", true),
        url: atom_link_url(&links),
    })
}

/// Picks the permalink among `<link>` elements: prefer `type="text/html"`,
/// else the first link in document order.
fn atom_link_url(links: &[&Element]) -> Option<String> {
    let link = links
        .iter()
        .find(|link| link.attr("type") == Some("text/html"))
        .or_else(|| links.first())?;

    link.attr("href").map(str::to_string)
}

fn link_candidates(links: &[&Element]) -> Vec<LinkCandidate> {
    links
        .iter()
        .map(|link| LinkCandidate {
            href: link.attr("href").unwrap_or_default().to_string(),
            media_type: link.attr("type").map(str::to_string),
            rel: link.attr("rel").map(str::to_string),
            title: link.attr("title").map(str::to_string),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml_tree;

    fn parse(xml: &str) -> PostList {
        let doc = xml_tree::parse(xml).expect("should parse xml");
        let feed = doc.find_first("feed", true).expect("feed root");
        parse_atom_feed(feed)
    }

    #[test]
    fn test_feed_level_fields() {
        let list = parse(
            r#"<feed xmlns="http://www.w3.org/2005/Atom" xml:lang="en">
                <title>Example Feed</title>
                <subtitle>A subtitle.</subtitle>
                <rights>© 2023 Example</rights>
                <updated>2023-12-13T18:30:02Z</updated>
                <icon>https://example.org/icon.png</icon>
                <logo>https://example.org/logo.png</logo>
                <link href="https://example.org/" type="text/html"/>
                <link href="https://example.org/feed" rel="self" type="application/atom+xml"/>
            </feed>"#,
        );

        assert_eq!(list.container.version.as_deref(), Some("1.0"));
        assert_eq!(list.title.as_deref(), Some("Example Feed"));
        assert_eq!(
            list.description.as_ref().and_then(|d| d.text.as_deref()),
            Some("A subtitle.")
        );
        assert_eq!(list.copyright.as_deref(), Some("© 2023 Example"));
        assert!(list.updated_at.is_some());
        assert_eq!(list.url.as_deref(), Some("https://example.org/"));
        assert_eq!(list.language.as_deref(), Some("en"));
        assert_eq!(list.image.len(), 2);
        assert_eq!(list.image[0].url, "https://example.org/icon.png");
    }

    #[test]
    fn test_entry_mapping() {
        let list = parse(
            r#"<feed xmlns="http://www.w3.org/2005/Atom">
                <title>F</title>
                <entry>
                    <id>urn:uuid:1</id>
                    <title>First Post</title>
                    <link href="https://example.org/enclosure.mp3" type="audio/mpeg"/>
                    <link href="https://example.org/posts/1" type="text/html"/>
                    <published>2023-12-01T00:00:00Z</published>
                    <updated>2023-12-02T00:00:00Z</updated>
                    <author><name>Jane</name><email>jane@example.org</email><uri>https://jane.example</uri></author>
                    <summary type="text">Plain summary</summary>
                    <content type="html">&lt;p&gt;Body&lt;/p&gt;</content>
                    <category term="tech" label="Technology"/>
                    <category term="misc"/>
                    <category/>
                </entry>
            </feed>"#,
        );

        assert_eq!(list.posts.len(), 1);
        let post = &list.posts[0];
        assert_eq!(post.guid.as_deref(), Some("urn:uuid:1"));
        assert_eq!(post.title.as_deref(), Some("First Post"));
        // text/html wins over the first (enclosure) link
        assert_eq!(post.link.as_deref(), Some("https://example.org/posts/1"));

        let authors = post.authors.as_ref().expect("authors");
        assert_eq!(authors[0].name.as_deref(), Some("Jane"));
        assert_eq!(authors[0].email.as_deref(), Some("jane@example.org"));
        assert_eq!(authors[0].uri.as_deref(), Some("https://jane.example"));

        assert_eq!(
            post.content.as_ref().and_then(|c| c.html.as_deref()),
            Some("<p>Body</p>")
        );
        assert_eq!(
            post.summary.as_ref().and_then(|s| s.text.as_deref()),
            Some("Plain summary")
        );

        let categories = post.categories.as_ref().expect("categories");
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name.as_deref(), Some("Technology"));
        assert_eq!(categories[1].name.as_deref(), Some("misc"));

        assert!(post.published_at.is_some());
        assert_ne!(post.published_at, post.updated_at);
    }

    #[test]
    fn test_published_falls_back_to_updated() {
        let list = parse(
            r#"<feed xmlns="http://www.w3.org/2005/Atom">
                <entry><id>1</id><updated>2023-12-02T00:00:00Z</updated></entry>
            </feed>"#,
        );
        let post = &list.posts[0];
        assert!(post.published_at.is_some());
        assert_eq!(post.published_at, post.updated_at);
    }

    #[test]
    fn test_media_from_content_src() {
        let list = parse(
            r#"<feed xmlns="http://www.w3.org/2005/Atom">
                <entry>
                    <id>1</id>
                    <content src="https://example.org/video.mp4" type="video/mp4"/>
                </entry>
            </feed>"#,
        );
        let media = list.posts[0].media.as_ref().expect("media");
        assert_eq!(media.len(), 1);
        assert_eq!(media[0].url, "https://example.org/video.mp4");
        assert_eq!(media[0].media_type.as_deref(), Some("video/mp4"));
    }

    #[test]
    fn test_source_backlink() {
        let list = parse(
            r#"<feed xmlns="http://www.w3.org/2005/Atom">
                <entry>
                    <id>1</id>
                    <title>Repost</title>
                    <source>
                        <title>Origin Blog</title>
                        <link href="https://origin.example/feed" type="text/html"/>
                    </source>
                </entry>
            </feed>"#,
        );
        let source = list.posts[0].source.as_ref().expect("source");
        assert_eq!(source.title.as_deref(), Some("Origin Blog"));
        assert_eq!(source.url.as_deref(), Some("https://origin.example/feed"));
    }

    #[test]
    fn test_pagination_from_feed_links() {
        let list = parse(
            r#"<feed xmlns="http://www.w3.org/2005/Atom">
                <link rel="self" href="https://example.org/feed?page=2" type="application/atom+xml"/>
                <link rel="next" href="https://example.org/feed?page=3" type="application/atom+xml"/>
                <link rel="previous" href="https://example.org/feed?page=1" type="application/atom+xml"/>
                <link rel="first" href="https://example.org/feed" type="application/atom+xml"/>
            </feed>"#,
        );
        assert_eq!(
            list.pagination.next.as_ref().map(|s| s.url()),
            Some("https://example.org/feed?page=3")
        );
        assert_eq!(
            list.pagination.previous.as_ref().map(|s| s.url()),
            Some("https://example.org/feed?page=1")
        );
        assert!(list.pagination.first.is_some());
        assert!(list.pagination.last.is_none());
    }

    #[test]
    fn test_no_authors_is_empty_not_absent() {
        let list = parse(
            r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry><id>1</id></entry></feed>"#,
        );
        assert_eq!(list.posts[0].authors.as_deref(), Some(&[][..]));
    }
}
