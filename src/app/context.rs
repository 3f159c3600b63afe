use std::path::PathBuf;
use std::sync::Arc;

use crate::aggregator::{ArticleAggregator, DEFAULT_WORKERS};
use crate::app::error::{EstuaryError, Result};
use crate::cache::{FeedCache, FileCacheStore};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::store::FeedListStore;

pub struct AppContext {
    pub store: FeedListStore,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub cache: Arc<FeedCache<FileCacheStore>>,
    pub aggregator: ArticleAggregator<FileCacheStore>,
}

impl AppContext {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        Self::with_workers(data_dir, DEFAULT_WORKERS)
    }

    pub fn with_workers(data_dir: Option<PathBuf>, workers: usize) -> Result<Self> {
        let data_dir = match data_dir {
            Some(p) => p,
            None => Self::default_data_dir()?,
        };
        std::fs::create_dir_all(&data_dir)?;

        let store = FeedListStore::new(data_dir.join("feeds.json"));
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new());
        let cache = Arc::new(FeedCache::new(
            FileCacheStore::new(data_dir.join("cache"))?,
            fetcher.clone(),
        ));
        let aggregator = ArticleAggregator::with_workers(cache.clone(), workers);

        Ok(Self {
            store,
            fetcher,
            cache,
            aggregator,
        })
    }

    fn default_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| EstuaryError::Config("Could not find data directory".into()))?;
        Ok(data_dir.join("estuary"))
    }
}
