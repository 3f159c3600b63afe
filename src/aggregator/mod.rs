use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::cache::{CacheStore, FeedCache};
use crate::domain::{Article, Feed};

pub const DEFAULT_WORKERS: usize = 10;

/// Which feeds an aggregate call draws from.
#[derive(Debug, Clone)]
pub enum FeedSelection {
    All,
    Ids(HashSet<String>),
}

impl FeedSelection {
    /// Parse a comma-separated id list; `None` selects every feed.
    pub fn from_csv(raw: Option<&str>) -> Self {
        match raw {
            None => FeedSelection::All,
            Some(csv) => FeedSelection::Ids(
                csv.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }

    pub fn contains(&self, feed_id: &str) -> bool {
        match self {
            FeedSelection::All => true,
            FeedSelection::Ids(ids) => ids.contains(feed_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Merges cached feed snapshots into one searchable, paginated timeline.
pub struct ArticleAggregator<S: CacheStore> {
    cache: Arc<FeedCache<S>>,
    semaphore: Arc<Semaphore>,
}

impl<S> ArticleAggregator<S>
where
    S: CacheStore + Send + Sync + 'static,
{
    pub fn new(cache: Arc<FeedCache<S>>) -> Self {
        Self::with_workers(cache, DEFAULT_WORKERS)
    }

    pub fn with_workers(cache: Arc<FeedCache<S>>, workers: usize) -> Self {
        Self {
            cache,
            semaphore: Arc::new(Semaphore::new(workers)),
        }
    }

    /// Build one page of the merged timeline.
    ///
    /// Feeds are resolved through the cache concurrently, bounded by the
    /// worker semaphore; merging starts only after every lookup has
    /// finished. Feeds that resolve to nothing, or to zero items, are
    /// skipped silently. Matching items are sorted newest-first with a
    /// stable sort, so items sharing a timestamp keep feed-list order.
    pub async fn aggregate(
        &self,
        feeds: &[Feed],
        selection: &FeedSelection,
        page: usize,
        per_page: usize,
        search: &str,
        ttl_minutes: u64,
    ) -> (Vec<Article>, Pagination) {
        let selected: Vec<Feed> = feeds
            .iter()
            .filter(|f| selection.contains(&f.id))
            .cloned()
            .collect();

        let mut handles = Vec::with_capacity(selected.len());
        for feed in selected {
            let cache = self.cache.clone();
            let semaphore = self.semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("Semaphore closed");
                let outcome = cache.get(&feed.id, &feed.url, ttl_minutes).await;
                (feed, outcome)
            }));
        }

        // Collect in spawn order so the merged list keeps feed-list order
        // before sorting; that order is the tie-break.
        let mut articles: Vec<Article> = Vec::new();
        for handle in handles {
            let (feed, outcome) = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                    continue;
                }
            };

            let Some(snapshot) = outcome.into_snapshot() else {
                debug!(feed_id = %feed.id, "skipping unavailable feed");
                continue;
            };
            if snapshot.feed.items.is_empty() {
                continue;
            }

            for item in snapshot.feed.items {
                articles.push(Article {
                    item,
                    feed_id: feed.id.clone(),
                    feed_title: feed.title.clone(),
                    feed_icon: feed.icon.clone(),
                });
            }
        }

        if !search.is_empty() {
            let needle = search.to_lowercase();
            articles.retain(|a| {
                a.item.title.to_lowercase().contains(&needle)
                    || a.item.description.to_lowercase().contains(&needle)
            });
        }

        articles.sort_by(|a, b| b.item.timestamp.cmp(&a.item.timestamp));

        let page = page.max(1);
        let per_page = per_page.max(1);
        let total = articles.len();
        let total_pages = total.div_ceil(per_page);
        let offset = (page - 1).saturating_mul(per_page);

        let items: Vec<Article> = articles.into_iter().skip(offset).take(per_page).collect();

        (
            items,
            Pagination {
                page,
                per_page,
                total,
                total_pages,
            },
        )
    }
}
