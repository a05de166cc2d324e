// ABOUTME: RSS mapper covering 0.91, 1.0 (RDF) and 2.0 channels.
// ABOUTME: Dublin Core fallbacks, media:content/enclosure media, and atom:link pagination.

use crate::authors::parse_rss_authors;
use crate::links::{resolve_pagination, LinkCandidate};
use crate::models::{
    Container, FeedKind, PostContent, PostItem, PostList, PostMedia, PostSource, PostTerm,
};
use crate::xml_tree::Element;

/// Maps a parsed `<rss>` or `<rdf:RDF>` element into a post list.
pub fn parse_rss_feed(rss: &Element) -> PostList {
    let is_rdf = rss.name.eq_ignore_ascii_case("rdf:rdf");
    let version = match rss.attr("version") {
        Some(version) => Some(version.to_string()),
        // RDF documents carry no version attribute; they are RSS 1.0.
        None if is_rdf => Some("1.0".to_string()),
        None => None,
    };

    let mut list = PostList::new(Container::new(FeedKind::RssFeed, version));

    if let Some(channel) = rss.find_first("channel", true) {
        list.title = channel.text_of("title", false);
        list.url = channel.text_of("link", false);
        list.description = channel.text_of("description", false).and_then(PostContent::html);
        list.copyright = channel
            .text_of("copyright", false)
            .or_else(|| channel.text_of("dc:rights", false));
        list.updated_at = channel
            .date_of("lastBuildDate", false)
            .or_else(|| channel.date_of("dc:date", false));
        list.language = channel.text_of("language", false);
        list.image = parse_rss_images(&channel.find_all("image", false));
        list.pagination = resolve_pagination(&atom_link_candidates(channel));
    }

    list.posts = parse_rss_items(rss);

    list
}

/// Maps `<item>` elements, wherever they sit: inside the channel (RSS
/// 0.91/2.0) or as channel siblings (RSS 1.0).
fn parse_rss_items(rss: &Element) -> Vec<PostItem> {
    rss.find_all("item", true)
        .into_iter()
        .map(|item| {
            let author = item.text_of("author", true);
            let creator = item.text_of("dc:creator", true);
            let enclosures = item.find_matching(
                &|name| name == "enclosure" || name == "media:content",
                true,
            );

            PostItem {
                guid: item.text_of("guid", true),
                title: item.text_of("title", true),
                link: item.text_of("link", true),
                published_at: item
                    .date_of("pubDate", true)
                    .or_else(|| item.date_of("dc:date", true)),
                authors: Some(parse_rss_authors(author.as_deref(), creator.as_deref())),
                categories: Some(parse_rss_categories(&item.find_all("category", true))),
                media: Some(parse_rss_media(&enclosures)),
                source: parse_rss_source(item.find_first("source", true)),
                content: item.text_of("content:encoded", true).and_then(PostContent::html),
                summary: item.text_of("description", true).and_then(PostContent::html),
                updated_at: None,
                tags: None,
            }
        })
        .collect()
}

/// Maps channel `<image>` elements. RSS 1.0 references the image through an
/// `rdf:resource` attribute, in which case the resource URI alone becomes
/// the URL; otherwise the nested url/title/width/height elements apply.
/// Entries without a URL are dropped.
fn parse_rss_images(images: &[&Element]) -> Vec<PostMedia> {
    images
        .iter()
        .filter_map(|image| {
            if let Some(resource) = image.attr("rdf:resource").filter(|r| !r.is_empty()) {
                return Some(PostMedia::from_url(resource));
            }

            let url = image.text_of("url", true)?;
            let mut media = PostMedia::from_url(url);
            media.title = image.text_of("title", true);
            media.width = image.number_of("width", true);
            media.height = image.number_of("height", true);
            Some(media)
        })
        .collect()
}

fn parse_rss_categories(categories: &[&Element]) -> Vec<PostTerm> {
    categories
        .iter()
        .filter_map(|category| {
            let name = category.text_content();
            (!name.is_empty()).then(|| PostTerm {
                id: None,
                name: Some(name),
                url: None,
            })
        })
        .collect()
}

/// Maps `<enclosure>` and `<media:content>` elements; a non-empty `url`
/// attribute is required for the entry to be retained. The byte length
/// comes from `fileSize` (Media RSS) or `length`.
fn parse_rss_media(enclosures: &[&Element]) -> Vec<PostMedia> {
    enclosures
        .iter()
        .filter_map(|enclosure| {
            let url = enclosure.attr("url").filter(|url| !url.is_empty())?;
            let mut media = PostMedia::from_url(url);
            media.length = enclosure
                .attr("fileSize")
                .or_else(|| enclosure.attr("length"))
                .and_then(|length| length.trim().parse().ok());
            media.media_type = enclosure.attr("type").map(str::to_string);
            Some(media)
        })
        .collect()
}

fn parse_rss_source(source: Option<&Element>) -> Option<PostSource> {
    let source = source?;
    let title = source.text_content();

    Some(PostSource {
        url: source.attr("url").map(str::to_string),
        title: (!title.is_empty()).then_some(title),
    })
}

/// Channel-level `atom:link` elements, resolved the same way as Atom
/// feed-level links.
fn atom_link_candidates(channel: &Element) -> Vec<LinkCandidate> {
    channel
        .find_all("atom:link", false)
        .into_iter()
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
        let root = doc
            .find_matching(&|name| name == "rss" || name.eq_ignore_ascii_case("rdf:rdf"), true)
            .into_iter()
            .next()
            .expect("rss root");
        parse_rss_feed(root)
    }

    #[test]
    fn test_channel_fields() {
        let list = parse(
            r#"<rss version="2.0">
                <channel>
                    <title>Tech Blog</title>
                    <link>https://example.com</link>
                    <description>&lt;b&gt;All&lt;/b&gt; the news</description>
                    <copyright>© Example</copyright>
                    <lastBuildDate>Mon, 15 Jan 2024 10:00:00 +0000</lastBuildDate>
                    <language>en-us</language>
                </channel>
            </rss>"#,
        );

        assert_eq!(list.container.version.as_deref(), Some("2.0"));
        assert_eq!(list.title.as_deref(), Some("Tech Blog"));
        assert_eq!(list.url.as_deref(), Some("https://example.com"));
        assert_eq!(
            list.description.as_ref().and_then(|d| d.html.as_deref()),
            Some("<b>All</b> the news")
        );
        assert_eq!(list.copyright.as_deref(), Some("© Example"));
        assert!(list.updated_at.is_some());
        assert_eq!(list.language.as_deref(), Some("en-us"));
    }

    #[test]
    fn test_dc_fallbacks() {
        let list = parse(
            r#"<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
                <channel>
                    <title>T</title>
                    <dc:rights>Rights Holder</dc:rights>
                    <dc:date>2024-01-15T10:00:00Z</dc:date>
                    <item>
                        <title>Post</title>
                        <dc:date>2024-01-10T08:00:00Z</dc:date>
                        <dc:creator>Jane Doe (https://jane.example)</dc:creator>
                    </item>
                </channel>
            </rss>"#,
        );

        assert_eq!(list.copyright.as_deref(), Some("Rights Holder"));
        assert!(list.updated_at.is_some());

        let post = &list.posts[0];
        assert!(post.published_at.is_some());
        let authors = post.authors.as_ref().expect("authors");
        assert_eq!(authors[0].name.as_deref(), Some("Jane Doe"));
        assert_eq!(authors[0].uri.as_deref(), Some("https://jane.example"));
    }

    #[test]
    fn test_item_content_and_summary_split() {
        let list = parse(
            r#"<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
                <channel>
                    <item>
                        <guid>post-1</guid>
                        <title>First</title>
                        <link>https://example.com/1</link>
                        <description>A short teaser.</description>
                        <content:encoded><![CDATA[<p>The whole body.</p>]]></content:encoded>
                    </item>
                </channel>
            </rss>"#,
        );

        let post = &list.posts[0];
        assert_eq!(post.guid.as_deref(), Some("post-1"));
        assert_eq!(
            post.content.as_ref().and_then(|c| c.html.as_deref()),
            Some("<p>The whole body.</p>")
        );
        assert_eq!(
            post.summary.as_ref().and_then(|s| s.html.as_deref()),
            Some("A short teaser.")
        );
    }

    #[test]
    fn test_media_requires_url() {
        let list = parse(
            r#"<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
                <channel>
                    <item>
                        <title>Episode</title>
                        <enclosure url="https://cdn/show.mp3" type="audio/mpeg" length="12345"/>
                        <media:content url="https://cdn/show.jpg" type="image/jpeg" fileSize="678"/>
                        <enclosure type="audio/mpeg"/>
                    </item>
                </channel>
            </rss>"#,
        );

        let media = list.posts[0].media.as_ref().expect("media");
        assert_eq!(media.len(), 2);
        assert_eq!(media[0].url, "https://cdn/show.mp3");
        assert_eq!(media[0].length, Some(12345));
        assert_eq!(media[1].url, "https://cdn/show.jpg");
        assert_eq!(media[1].length, Some(678));
    }

    #[test]
    fn test_rdf_version_and_resource_image() {
        let list = parse(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
                <channel>
                    <title>RDF Blog</title>
                    <image rdf:resource="https://example.com/logo.png"/>
                </channel>
                <item>
                    <title>Outside the channel</title>
                    <link>https://example.com/1</link>
                </item>
            </rdf:RDF>"#,
        );

        assert_eq!(list.container.version.as_deref(), Some("1.0"));
        assert_eq!(list.image.len(), 1);
        assert_eq!(list.image[0].url, "https://example.com/logo.png");
        // RSS 1.0 items live outside the channel and are still found.
        assert_eq!(list.posts.len(), 1);
        assert_eq!(list.posts[0].title.as_deref(), Some("Outside the channel"));
    }

    #[test]
    fn test_channel_image_with_dimensions() {
        let list = parse(
            r#"<rss version="0.91">
                <channel>
                    <image>
                        <url>https://example.com/banner.gif</url>
                        <title>Banner</title>
                        <width>88</width>
                        <height>31</height>
                    </image>
                    <image><title>no url, dropped</title></image>
                </channel>
            </rss>"#,
        );

        assert_eq!(list.image.len(), 1);
        assert_eq!(list.image[0].url, "https://example.com/banner.gif");
        assert_eq!(list.image[0].title.as_deref(), Some("Banner"));
        assert_eq!(list.image[0].width, Some(88));
        assert_eq!(list.image[0].height, Some(31));
    }

    #[test]
    fn test_source_backlink() {
        let list = parse(
            r#"<rss version="2.0">
                <channel>
                    <item>
                        <title>Syndicated</title>
                        <source url="https://origin.example/feed">Origin Blog</source>
                    </item>
                </channel>
            </rss>"#,
        );

        let source = list.posts[0].source.as_ref().expect("source");
        assert_eq!(source.url.as_deref(), Some("https://origin.example/feed"));
        assert_eq!(source.title.as_deref(), Some("Origin Blog"));
    }

    #[test]
    fn test_atom_link_pagination() {
        let list = parse(
            r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
                <channel>
                    <title>Paged</title>
                    <atom:link rel="self" href="https://example.com/feed" type="application/rss+xml"/>
                    <atom:link rel="next" href="https://example.com/feed?paged=2" type="application/rss+xml"/>
                </channel>
            </rss>"#,
        );

        assert_eq!(
            list.pagination.next.as_ref().map(|s| s.url()),
            Some("https://example.com/feed?paged=2")
        );
        assert!(list.pagination.previous.is_none());
    }

    #[test]
    fn test_empty_author_strings_give_empty_list() {
        let list = parse(
            r#"<rss version="2.0"><channel><item><title>T</title></item></channel></rss>"#,
        );
        assert_eq!(list.posts[0].authors.as_deref().map(<[_]>::len), Some(0));
    }

    #[test]
    fn test_categories_from_text() {
        let list = parse(
            r#"<rss version="2.0">
                <channel>
                    <item>
                        <category>Rust</category>
                        <category>Feeds</category>
                        <category></category>
                    </item>
                </channel>
            </rss>"#,
        );
        let categories = list.posts[0].categories.as_ref().expect("categories");
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name.as_deref(), Some("Rust"));
    }
}

