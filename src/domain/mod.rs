pub mod feed;
pub mod item;
pub mod snapshot;

pub use feed::{generate_feed_id, group_by_category, validate_feed_url, Feed};
pub use item::{Article, Item};
pub use snapshot::{FeedSnapshot, ParsedFeed};
