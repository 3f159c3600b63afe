use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::app::Result;
use crate::domain::FeedSnapshot;

/// A stored snapshot together with its age, measured from the moment the
/// record was last written. The age is the sole staleness signal; records
/// carry no expiry field of their own.
pub struct CachedRecord {
    pub snapshot: FeedSnapshot,
    pub age: Duration,
}

/// Key-value persistence for cache records, one record per feed id.
///
/// `put` must replace the record atomically: a concurrent reader sees
/// either the old record or the new one, never a partial write. Lost
/// updates between concurrent writers of the same id are acceptable; the
/// last writer wins.
pub trait CacheStore {
    fn get(&self, feed_id: &str) -> Result<Option<CachedRecord>>;
    fn put(&self, feed_id: &str, snapshot: &FeedSnapshot) -> Result<()>;
    fn remove(&self, feed_id: &str) -> Result<()>;
}

/// Deterministic one-way hash of a feed id, used as the cache filename.
pub fn cache_key(feed_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(feed_id.as_bytes());
    hex::encode(hasher.finalize())
}

/// Production store: one JSON file per feed id under a cache directory,
/// named by [`cache_key`]. The file's modification time is the record's
/// write time.
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn record_path(&self, feed_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(feed_id)))
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, feed_id: &str) -> Result<Option<CachedRecord>> {
        let path = self.record_path(feed_id);

        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // An unreadable record counts as a miss; the next successful
        // fetch overwrites it.
        let snapshot: FeedSnapshot = match serde_json::from_slice(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("discarding unreadable cache record {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        let age = fs::metadata(&path)?
            .modified()
            .ok()
            .and_then(|written| SystemTime::now().duration_since(written).ok())
            .unwrap_or_default();

        Ok(Some(CachedRecord { snapshot, age }))
    }

    fn put(&self, feed_id: &str, snapshot: &FeedSnapshot) -> Result<()> {
        let path = self.record_path(feed_id);
        let tmp = self.dir.join(format!(
            "{}.{}.tmp",
            cache_key(feed_id),
            std::process::id()
        ));

        fs::write(&tmp, serde_json::to_vec(snapshot)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, feed_id: &str) -> Result<()> {
        match fs::remove_file(self.record_path(feed_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryCacheStore {
    records: Mutex<HashMap<String, (FeedSnapshot, Instant)>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift a record's write time into the past, so tests can cross the
    /// TTL boundary without sleeping.
    pub fn backdate(&self, feed_id: &str, by: Duration) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((_, written_at)) = records.get_mut(feed_id) {
            *written_at -= by;
        }
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, feed_id: &str) -> Result<Option<CachedRecord>> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(feed_id).map(|(snapshot, written_at)| CachedRecord {
            snapshot: snapshot.clone(),
            age: written_at.elapsed(),
        }))
    }

    fn put(&self, feed_id: &str, snapshot: &FeedSnapshot) -> Result<()> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(feed_id.to_string(), (snapshot.clone(), Instant::now()));
        Ok(())
    }

    fn remove(&self, feed_id: &str) -> Result<()> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.remove(feed_id);
        Ok(())
    }
}
