use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::Feed;

/// Tunables stored alongside the feed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Minutes a cached feed snapshot stays fresh.
    pub cache_minutes: u64,
    /// Timeline page size.
    pub items_per_page: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_minutes: 15,
            items_per_page: 20,
        }
    }
}

/// The persisted feed list document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedList {
    #[serde(default)]
    pub feeds: Vec<Feed>,
    #[serde(default)]
    pub settings: Settings,
}

impl FeedList {
    pub fn find(&self, feed_id: &str) -> Option<&Feed> {
        self.feeds.iter().find(|f| f.id == feed_id)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.feeds.iter().any(|f| f.url == url)
    }

    /// Drop a feed by id; returns whether anything was removed.
    pub fn remove(&mut self, feed_id: &str) -> bool {
        let before = self.feeds.len();
        self.feeds.retain(|f| f.id != feed_id);
        self.feeds.len() != before
    }
}

/// Load/save for the single `feeds.json` document.
pub struct FeedListStore {
    path: PathBuf,
}

impl FeedListStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// A missing file is an empty list with default settings.
    pub fn load(&self) -> Result<FeedList> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(FeedList::default()),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, list: &FeedList) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", std::process::id()));
        fs::write(&tmp, serde_json::to_string_pretty(list)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
