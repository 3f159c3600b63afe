pub mod store;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::Result;
use crate::domain::FeedSnapshot;
use crate::fetcher::Fetcher;
use crate::parser;

pub use store::{cache_key, CacheStore, CachedRecord, FileCacheStore, MemoryCacheStore};

/// Outcome of a cache lookup.
///
/// Every call resolves to exactly one of these; callers that only care
/// about usable data can collapse the enum with [`CacheOutcome::into_snapshot`].
#[derive(Debug)]
pub enum CacheOutcome {
    /// A record younger than the TTL was served unchanged.
    Fresh(FeedSnapshot),
    /// A live fetch succeeded and the record was replaced.
    Fetched(FeedSnapshot),
    /// The fetch failed; an existing record of any age was served instead.
    Stale(FeedSnapshot),
    /// The fetch failed and no record exists.
    Unavailable,
}

impl CacheOutcome {
    pub fn into_snapshot(self) -> Option<FeedSnapshot> {
        match self {
            CacheOutcome::Fresh(s) | CacheOutcome::Fetched(s) | CacheOutcome::Stale(s) => Some(s),
            CacheOutcome::Unavailable => None,
        }
    }
}

/// Per-feed TTL cache in front of fetch + parse.
pub struct FeedCache<S: CacheStore> {
    store: S,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
}

impl<S: CacheStore> FeedCache<S> {
    pub fn new(store: S, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self { store, fetcher }
    }

    /// Resolve a feed under the TTL policy.
    ///
    /// A record younger than `ttl_minutes` is served as [`CacheOutcome::Fresh`]
    /// with its age in whole minutes. Otherwise a live fetch is attempted:
    /// on success the record is replaced and returned; on failure an
    /// existing record of any age is served as [`CacheOutcome::Stale`]
    /// without touching the disk, and [`CacheOutcome::Unavailable`] is the
    /// last resort. `ttl_minutes = 0` always attempts a refetch, keeping
    /// the stale fallback.
    ///
    /// Fetch and parse failures never escape this method.
    pub async fn get(&self, feed_id: &str, url: &str, ttl_minutes: u64) -> CacheOutcome {
        if ttl_minutes > 0 {
            match self.store.get(feed_id) {
                Ok(Some(record)) => {
                    let age_minutes = record.age.as_secs_f64() / 60.0;
                    if age_minutes < ttl_minutes as f64 {
                        debug!(feed_id, age_minutes, "serving fresh cache record");
                        let mut snapshot = record.snapshot;
                        snapshot.from_cache = true;
                        snapshot.cache_age = Some(age_minutes.round() as u64);
                        return CacheOutcome::Fresh(snapshot);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(feed_id, "cache read failed: {e}"),
            }
        }

        match self.refresh(feed_id, url).await {
            Ok(snapshot) => CacheOutcome::Fetched(snapshot),
            Err(e) => {
                warn!(feed_id, url, "refresh failed ({e}), falling back to cache");
                match self.store.get(feed_id) {
                    Ok(Some(record)) => {
                        let mut snapshot = record.snapshot;
                        snapshot.from_cache = true;
                        snapshot.stale = true;
                        CacheOutcome::Stale(snapshot)
                    }
                    _ => CacheOutcome::Unavailable,
                }
            }
        }
    }

    /// Drop the stored record for a feed, if any.
    pub fn remove(&self, feed_id: &str) -> Result<()> {
        self.store.remove(feed_id)
    }

    async fn refresh(&self, feed_id: &str, url: &str) -> Result<FeedSnapshot> {
        let body = self.fetcher.fetch(url).await?;
        let parsed = parser::parse(&body)?;
        info!(feed_id, url, items = parsed.item_count, "fetched feed");

        let snapshot = FeedSnapshot::new(feed_id, parsed);
        if let Err(e) = self.store.put(feed_id, &snapshot) {
            warn!(feed_id, "failed to persist cache record: {e}");
        }

        Ok(snapshot)
    }
}
