// ABOUTME: CLI for postscout: discover a site's post source, fetch it, and print the normalized list as JSON.
// ABOUTME: Local files and stdin are parsed directly through the sniffer for offline verification.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use postscout_client::{Client, DiscoverOptions, FetchOptions, WordpressOptions};
use postscout_feed::parse_raw_feed;

/// Discover and normalize a site's post feed.
#[derive(Parser, Debug)]
#[command(name = "postscout")]
#[command(about = "Find a site's post source and print its normalized post list", long_about = None)]
struct Args {
    /// A site URL (http/https) to discover, or a local feed file. Use "-"
    /// to read a feed document from stdin.
    target: String,

    /// Prioritize Atom/RSS/JSON feeds over the WordPress REST API.
    #[arg(long, default_value_t = false)]
    prefer_feeds: bool,

    /// Probe well-known feed and API paths when nothing is advertised.
    #[arg(long, default_value_t = false)]
    guess_paths: bool,

    /// Only print the discovered source, without fetching the post list.
    #[arg(long, default_value_t = false)]
    discover_only: bool,

    /// Page number for WordPress sources.
    #[arg(long)]
    page: Option<u32>,

    /// Amount of posts to list for WordPress sources.
    #[arg(long)]
    limit: Option<u32>,

    /// Skip requesting embedded author/term/media resources.
    #[arg(long, default_value_t = false)]
    no_embedded: bool,

    /// Also fetch blog-level metadata from the WordPress API root.
    #[arg(long, default_value_t = false)]
    blog_info: bool,

    /// Synthesize missing plain-text variants from HTML contents.
    #[arg(long, default_value_t = false)]
    fill_text: bool,

    /// Declared media type when parsing a local file or stdin.
    #[arg(long)]
    media_type: Option<String>,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let output = if is_remote(&args.target) {
        run_remote(&args).await?
    } else {
        run_local(&args)?
    };

    if args.compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}

fn is_remote(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

async fn run_remote(args: &Args) -> Result<serde_json::Value> {
    let client = Client::new();

    let discover = DiscoverOptions {
        prefer_feeds: args.prefer_feeds,
        try_guess_paths: args.guess_paths,
        ..Default::default()
    };
    let source = client
        .discover_source(&args.target, &discover)
        .await
        .with_context(|| format!("discovering a post source for {}", args.target))?;

    if args.discover_only {
        return Ok(json!({ "source": source }));
    }

    let fetch = FetchOptions {
        fill_text_contents: args.fill_text,
        wordpress: WordpressOptions {
            include_embedded: !args.no_embedded,
            fetch_blog_info: args.blog_info,
            page: args.page,
            limit: args.limit,
            ..Default::default()
        },
    };
    let list = client
        .fetch_post_list(&source, &fetch)
        .await
        .with_context(|| format!("fetching the post list from {}", source.url()))?;

    Ok(json!({ "source": source, "list": list }))
}

/// Parses a feed document from a file or stdin, without any discovery.
fn run_local(args: &Args) -> Result<serde_json::Value> {
    let raw = if args.target == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        let path = PathBuf::from(&args.target);
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?
    };

    let list = parse_raw_feed(&raw, args.media_type.as_deref())?;

    Ok(json!({ "list": list }))
}
