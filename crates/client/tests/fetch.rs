// ABOUTME: Integration tests for fetching post lists from feed URLs and the WordPress REST API.
// ABOUTME: Exercises content-type sniffing, pagination headers, blog info and text filling end to end.

use httpmock::prelude::*;
use postscout_client::{Client, ClientError, FetchOptions, WordpressOptions};
use postscout_feed::models::{DiscoveredSource, FeedKind};

fn feed_source(url: String) -> DiscoveredSource {
    DiscoveredSource::Feed {
        url,
        media_type: None,
        title: None,
    }
}

#[tokio::test]
async fn test_fetch_feed_uses_response_content_type() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200)
            .header("content-type", "application/rss+xml; charset=utf-8")
            .body(
                r#"<rss version="2.0"><channel>
                    <title>Wire</title>
                    <item><title>One</title><description>t</description></item>
                </channel></rss>"#,
            );
    });

    let client = Client::new();
    let list = client
        .fetch_post_list(&feed_source(server.url("/feed.xml")), &FetchOptions::default())
        .await
        .expect("should fetch");

    assert_eq!(list.container.kind, FeedKind::RssFeed);
    assert_eq!(list.title.as_deref(), Some("Wire"));
    assert_eq!(list.posts.len(), 1);
}

#[tokio::test]
async fn test_fetch_feed_declared_type_wins() {
    let server = MockServer::start();
    // The server lies about the content type; the discovered source knows better.
    server.mock(|when, then| {
        when.method(GET).path("/feed.json");
        then.status(200)
            .header("content-type", "text/plain")
            .body(r#"{"version":"https://jsonfeed.org/version/1.1","title":"J","items":[]}"#);
    });

    let client = Client::new();
    let source = DiscoveredSource::Feed {
        url: server.url("/feed.json"),
        media_type: Some("application/feed+json".to_string()),
        title: None,
    };
    let list = client
        .fetch_post_list(&source, &FetchOptions::default())
        .await
        .expect("should fetch");

    assert_eq!(list.container.kind, FeedKind::JsonFeed);
}

#[tokio::test]
async fn test_fetch_feed_error_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(503).body("maintenance");
    });

    let client = Client::new();
    let err = client
        .fetch_post_list(&feed_source(server.url("/feed.xml")), &FetchOptions::default())
        .await
        .expect_err("should fail");

    assert!(matches!(err, ClientError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_fetch_feed_empty_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200)
            .header("content-type", "application/rss+xml")
            .body("");
    });

    let client = Client::new();
    let err = client
        .fetch_post_list(&feed_source(server.url("/feed.xml")), &FetchOptions::default())
        .await
        .expect_err("should fail");

    assert!(matches!(err, ClientError::EmptyBody { .. }));
}

#[tokio::test]
async fn test_fill_text_contents() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/feed.xml");
        then.status(200)
            .header("content-type", "application/rss+xml")
            .body(
                r#"<rss version="2.0"><channel>
                    <title>Wire</title>
                    <description>&lt;p&gt;The &amp;amp; wire&lt;/p&gt;</description>
                    <item><title>One</title><description>&lt;b&gt;bold&lt;/b&gt; move</description></item>
                </channel></rss>"#,
            );
    });

    let client = Client::new();
    let options = FetchOptions {
        fill_text_contents: true,
        ..Default::default()
    };
    let list = client
        .fetch_post_list(&feed_source(server.url("/feed.xml")), &options)
        .await
        .expect("should fetch");

    assert_eq!(
        list.description.as_ref().and_then(|d| d.text.as_deref()),
        Some("The & wire")
    );
    assert_eq!(
        list.posts[0]
            .summary
            .as_ref()
            .and_then(|s| s.text.as_deref()),
        Some("bold move")
    );
}

#[tokio::test]
async fn test_wordpress_fetch_with_pagination_headers() {
    let server = MockServer::start();
    let posts_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/wp-json/wp/v2/posts")
            .query_param("page", "3")
            .query_param("_embed", "true");
        then.status(200)
            .header("content-type", "application/json")
            .header("x-wp-totalpages", "5")
            .header("x-wp-total", "47")
            .body(
                r#"[{
                    "id": 1,
                    "guid": {"rendered": "https://blog.example/?p=1"},
                    "title": {"rendered": "Hello"},
                    "content": {"rendered": "<p>Body</p>"},
                    "excerpt": {"rendered": "<p>Teaser</p>"},
                    "author": 1,
                    "link": "https://blog.example/hello",
                    "date": "2023-05-01T10:00:00"
                }]"#,
            );
    });

    let client = Client::new();
    let source = DiscoveredSource::WordpressApi {
        url: server.url("/wp-json"),
        page: Some(3),
    };
    let list = client
        .fetch_post_list(&source, &FetchOptions::default())
        .await
        .expect("should fetch");
    posts_mock.assert();

    assert_eq!(list.container.kind, FeedKind::WordpressRestApi);
    assert_eq!(list.container.version.as_deref(), Some("v2"));
    let metadata = list.container.metadata.as_ref().expect("metadata");
    assert_eq!(metadata["params"]["page"], "3");

    assert_eq!(list.posts.len(), 1);
    assert_eq!(list.posts[0].title.as_deref(), Some("Hello"));

    let pagination = &list.pagination;
    assert_eq!(pagination.current_page, Some(3));
    assert_eq!(pagination.total_pages, Some(5));
    assert_eq!(pagination.total_posts, Some(47));
    assert!(matches!(
        pagination.next,
        Some(DiscoveredSource::WordpressApi { page: Some(4), .. })
    ));
    assert!(matches!(
        pagination.previous,
        Some(DiscoveredSource::WordpressApi { page: Some(2), .. })
    ));
}

#[tokio::test]
async fn test_wordpress_query_shaping() {
    let server = MockServer::start();
    let posts_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/wp-json/wp/v2/posts")
            .query_param("page", "1")
            .query_param("limit", "5")
            .query_param("search", "rust")
            .query_param("author", "1,2")
            .query_param("orderby", "date");
        then.status(200)
            .header("content-type", "application/json")
            .body("[]");
    });

    let client = Client::new();
    let source = DiscoveredSource::WordpressApi {
        url: server.url("/wp-json"),
        page: None,
    };
    let mut wordpress = WordpressOptions {
        include_embedded: false,
        limit: Some(5),
        search: Some("rust".to_string()),
        authors: vec![1, 2],
        ..Default::default()
    };
    wordpress
        .additional_params
        .insert("orderby".to_string(), "date".to_string());
    let options = FetchOptions {
        wordpress,
        ..Default::default()
    };

    let list = client
        .fetch_post_list(&source, &options)
        .await
        .expect("should fetch");
    posts_mock.assert();

    assert!(list.posts.is_empty());
    // No pagination headers: only the request-derived fields are known.
    assert_eq!(list.pagination.current_page, Some(1));
    assert!(list.pagination.total_pages.is_none());
    assert!(list.pagination.next.is_none());
    assert!(list.pagination.first.is_some());
}

#[tokio::test]
async fn test_wordpress_blog_info_merged() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/wp-json/wp/v2/posts")
            .query_param("page", "1");
        then.status(200)
            .header("content-type", "application/json")
            .body("[]");
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/wp-json/")
            .query_param("_embed", "true");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"name":"Example Site","description":"A blog","url":"https://blog.example","home":"https://blog.example"}"#);
    });

    let client = Client::new();
    let source = DiscoveredSource::WordpressApi {
        url: server.url("/wp-json"),
        page: None,
    };
    let options = FetchOptions {
        wordpress: WordpressOptions {
            fetch_blog_info: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let list = client
        .fetch_post_list(&source, &options)
        .await
        .expect("should fetch");

    assert_eq!(list.title.as_deref(), Some("Example Site"));
    assert_eq!(list.url.as_deref(), Some("https://blog.example"));
    assert_eq!(
        list.description.as_ref().and_then(|d| d.text.as_deref()),
        Some("A blog")
    );
}

#[tokio::test]
async fn test_wordpress_blog_info_failure_is_swallowed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/wp-json/wp/v2/posts")
            .query_param("page", "1");
        then.status(200)
            .header("content-type", "application/json")
            .body("[]");
    });
    // No mock for the API root: the blog-info request 404s.

    let client = Client::new();
    let source = DiscoveredSource::WordpressApi {
        url: server.url("/wp-json"),
        page: None,
    };
    let options = FetchOptions {
        wordpress: WordpressOptions {
            fetch_blog_info: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let list = client
        .fetch_post_list(&source, &options)
        .await
        .expect("should fetch despite missing blog info");
    assert!(list.title.is_none());
}
