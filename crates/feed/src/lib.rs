// ABOUTME: Core feed normalization library for postscout.
// ABOUTME: Classifies links, sniffs formats, and maps Atom/RSS/JSON Feed/WordPress documents into one schema.

pub mod atom;
pub mod authors;
pub mod error;
pub mod html_text;
pub mod json_feed;
pub mod links;
pub mod models;
pub mod rss;
pub mod rss_json;
pub mod sniff;
pub mod time_parse;
pub mod wordpress;
pub mod xml_tree;

pub use atom::parse_atom_feed;
pub use authors::parse_rss_authors;
pub use error::FeedError;
pub use html_text::html_to_text;
pub use json_feed::parse_json_feed;
pub use links::{classify_links, resolve_pagination, LinkCandidate};
pub use models::{
    Container, DiscoveredSource, EntityId, FeedKind, PostContent, PostItem, PostList,
    PostListPagination, PostMedia, PostPerson, PostSource, PostTerm,
};
pub use rss::parse_rss_feed;
pub use rss_json::parse_rss_in_json_feed;
pub use sniff::parse_raw_feed;
pub use time_parse::parse_flexible_time;
