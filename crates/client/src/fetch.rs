// ABOUTME: Fetches a discovered source and normalizes it: feed documents via the sniffer, WordPress via its REST API.
// ABOUTME: WordPress query shaping, pagination headers, optional blog info, and text-content post-processing live here.

use serde_json::{json, Value};
use tracing::debug;

use postscout_feed::wordpress::{
    apply_blog_info, parse_wordpress_pagination, parse_wordpress_posts, WpBlogInfo, WpPost,
};
use postscout_feed::{
    html_to_text, parse_raw_feed, Container, DiscoveredSource, FeedError, FeedKind, PostContent,
    PostList,
};

use crate::discover::{FEED_ACCEPT, JSON_ACCEPT};
use crate::error::ClientError;
use crate::options::{FetchOptions, WordpressOptions};
use crate::transport;

/// Fetches the post list behind a discovered source.
pub(crate) async fn fetch_post_list(
    http: &reqwest::Client,
    source: &DiscoveredSource,
    options: &FetchOptions,
) -> Result<PostList, ClientError> {
    let mut list = match source {
        DiscoveredSource::Feed {
            url, media_type, ..
        } => fetch_feed_post_list(http, url, media_type.as_deref()).await?,
        DiscoveredSource::WordpressApi { url, page } => {
            let page = page.or(options.wordpress.page).unwrap_or(1);
            fetch_wordpress_post_list(http, url, page, &options.wordpress).await?
        }
    };

    if options.fill_text_contents {
        fill_text_contents(&mut list);
    }

    Ok(list)
}

/// Fetches and parses an Atom, RSS or JSON Feed document. The source's
/// declared type wins over the response content-type for sniffing.
pub(crate) async fn fetch_feed_post_list(
    http: &reqwest::Client,
    feed_url: &str,
    declared_type: Option<&str>,
) -> Result<PostList, ClientError> {
    let response = transport::fetch_text(http, feed_url, Some(FEED_ACCEPT)).await?;
    if response.is_error_status() {
        return Err(ClientError::Status {
            status: response.status,
            url: feed_url.to_string(),
        });
    }
    if response.body.is_empty() {
        return Err(ClientError::EmptyBody {
            url: feed_url.to_string(),
        });
    }

    let media_type = declared_type
        .map(str::to_string)
        .or_else(|| response.content_type.clone());

    Ok(parse_raw_feed(&response.body, media_type.as_deref())?)
}

/// Fetches one page of a WordPress post collection.
pub(crate) async fn fetch_wordpress_post_list(
    http: &reqwest::Client,
    wp_api_base: &str,
    page: u32,
    options: &WordpressOptions,
) -> Result<PostList, ClientError> {
    let params = build_query_params(page, options);
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(&params)
        .finish();
    let url = format!("{}?{}", join_api_path(wp_api_base, "/wp/v2/posts"), query);
    debug!(url = %url, page, "fetching wordpress posts");

    let response = transport::fetch_text(http, &url, Some(JSON_ACCEPT)).await?;
    if response.is_error_status() {
        return Err(ClientError::Status {
            status: response.status,
            url,
        });
    }

    let posts: Vec<WpPost> = serde_json::from_str(&response.body).map_err(FeedError::parse)?;

    let total_pages = response
        .header("x-wp-totalpages")
        .and_then(|value| value.trim().parse().ok());
    let total_posts = response
        .header("x-wp-total")
        .and_then(|value| value.trim().parse().ok());

    let mut container = Container::new(FeedKind::WordpressRestApi, Some("v2".to_string()));
    container.metadata = Some(json!({ "params": params_metadata(&params) }));

    let mut list = PostList::new(container);
    if options.fetch_blog_info {
        if let Some(info) = fetch_blog_info(http, wp_api_base, options).await {
            apply_blog_info(&mut list, &info);
        }
    }
    list.posts = parse_wordpress_posts(&posts);
    list.pagination = parse_wordpress_pagination(wp_api_base, page, total_pages, total_posts);

    Ok(list)
}

/// Fetches blog-level metadata from the API root. This request is
/// auxiliary: any failure just leaves the list without blog info.
async fn fetch_blog_info(
    http: &reqwest::Client,
    wp_api_base: &str,
    options: &WordpressOptions,
) -> Option<WpBlogInfo> {
    let mut url = join_api_path(wp_api_base, "/");
    if options.include_embedded {
        url.push_str("?_embed=true");
    }

    let response = transport::fetch_text(http, &url, Some(JSON_ACCEPT)).await.ok()?;
    if response.is_error_status() {
        debug!(url = %url, status = response.status, "blog info unavailable");
        return None;
    }

    serde_json::from_str(&response.body).ok()
}

fn build_query_params(page: u32, options: &WordpressOptions) -> Vec<(String, String)> {
    let mut params = vec![("page".to_string(), page.to_string())];

    if options.include_embedded {
        params.push(("_embed".to_string(), "true".to_string()));
    }
    if let Some(limit) = options.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(search) = &options.search {
        params.push(("search".to_string(), search.clone()));
    }
    if !options.authors.is_empty() {
        params.push(("author".to_string(), join_ids(&options.authors)));
    }
    if !options.categories.is_empty() {
        params.push(("categories".to_string(), join_ids(&options.categories)));
    }
    if !options.tags.is_empty() {
        params.push(("tags".to_string(), join_ids(&options.tags)));
    }
    for (key, value) in &options.additional_params {
        params.push((key.clone(), value.clone()));
    }

    params
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn params_metadata(params: &[(String, String)]) -> Value {
    let mut map = serde_json::Map::new();
    for (key, value) in params {
        map.insert(key.clone(), Value::String(value.clone()));
    }
    Value::Object(map)
}

/// Joins an API base and a route the way HTTP client base-URL handling
/// does: trailing and leading slashes collapse into one.
fn join_api_path(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Synthesizes missing plain-text variants from HTML contents.
fn fill_text_contents(list: &mut PostList) {
    fill_content(&mut list.description);
    for post in &mut list.posts {
        fill_content(&mut post.content);
        fill_content(&mut post.summary);
    }
}

fn fill_content(content: &mut Option<PostContent>) {
    if let Some(content) = content {
        if content.text.is_none() {
            if let Some(html) = &content.html {
                content.text = Some(html_to_text(html));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_params() {
        let mut options = WordpressOptions {
            limit: Some(5),
            search: Some("rust".to_string()),
            authors: vec![1, 2],
            ..Default::default()
        };
        options
            .additional_params
            .insert("orderby".to_string(), "date".to_string());

        let params = build_query_params(3, &options);
        assert_eq!(params[0], ("page".to_string(), "3".to_string()));
        assert!(params.contains(&("_embed".to_string(), "true".to_string())));
        assert!(params.contains(&("limit".to_string(), "5".to_string())));
        assert!(params.contains(&("author".to_string(), "1,2".to_string())));
        assert!(params.contains(&("orderby".to_string(), "date".to_string())));
    }

    #[test]
    fn test_join_api_path() {
        assert_eq!(
            join_api_path("https://e.com/wp-json/", "/wp/v2/posts"),
            "https://e.com/wp-json/wp/v2/posts"
        );
        assert_eq!(
            join_api_path("https://e.com/wp-json", "wp/v2/posts"),
            "https://e.com/wp-json/wp/v2/posts"
        );
        // A ?rest_route= base keeps its query prefix, like axios base URLs do.
        assert_eq!(
            join_api_path("https://e.com/?rest_route=/", "/wp/v2/posts"),
            "https://e.com/?rest_route=/wp/v2/posts"
        );
    }

    #[test]
    fn test_fill_text_contents() {
        let mut list = PostList::new(Container::new(FeedKind::RssFeed, None));
        list.description = PostContent::html("<p>Site &amp; blog</p>");
        list.posts.push(postscout_feed::PostItem {
            content: PostContent::html("<p>Body</p>"),
            summary: PostContent::from_parts(
                Some("<p>ignored</p>".to_string()),
                Some("already there".to_string()),
            ),
            ..Default::default()
        });

        fill_text_contents(&mut list);

        assert_eq!(
            list.description.as_ref().and_then(|d| d.text.as_deref()),
            Some("Site & blog")
        );
        let post = &list.posts[0];
        assert_eq!(
            post.content.as_ref().and_then(|c| c.text.as_deref()),
            Some("Body")
        );
        // Existing text is never overwritten.
        assert_eq!(
            post.summary.as_ref().and_then(|s| s.text.as_deref()),
            Some("already there")
        );
    }
}
