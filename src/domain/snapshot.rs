use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Item;

/// The result of parsing one feed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFeed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<Item>,
    pub item_count: usize,
}

/// A [`ParsedFeed`] with cache provenance, as stored on disk and served
/// to callers.
///
/// The on-disk record always carries `fromCache: false`; the cache layer
/// flips it (and sets `cacheAge`/`stale`) on the served copy only. The
/// record is replaced wholesale on every successful fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    #[serde(flatten)]
    pub feed: ParsedFeed,
    pub feed_id: String,
    pub fetched_at: DateTime<Utc>,
    pub from_cache: bool,
    /// Whole minutes since the record was written. Only present when the
    /// snapshot was served from a fresh cache hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age: Option<u64>,
    /// Set when an expired record is served because a refetch failed.
    #[serde(default, skip_serializing_if = "is_false")]
    pub stale: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FeedSnapshot {
    pub fn new(feed_id: &str, feed: ParsedFeed) -> Self {
        Self {
            feed,
            feed_id: feed_id.to_string(),
            fetched_at: Utc::now(),
            from_cache: false,
            cache_age: None,
            stale: false,
        }
    }
}
