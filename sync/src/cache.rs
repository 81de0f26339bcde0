use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use database::KeyValueStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use types::{CacheEntry, Clock, Dataset};

use crate::Scope;

/// Persisted shape of one cached dataset.
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    data: Value,
    timestamp: DateTime<Utc>,
}

/// Snapshots of the tournament's datasets, kept on the device so the UI can
/// render while offline. Entries older than the TTL read as missing.
pub struct LocalCache {
    scope: Scope,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: RwLock<HashMap<Dataset, CacheEntry>>,
}

impl LocalCache {
    pub fn new(
        scope: Scope,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            scope,
            storage,
            clock,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Stores `data` for `dataset`. Storage failures are logged and the write
    /// is dropped; callers never see them.
    pub async fn write(&self, dataset: Dataset, data: Value) {
        let key = self.scope.dataset_key(dataset);
        let timestamp = self.clock.now();
        let stored = StoredEntry {
            data,
            timestamp,
        };

        let persisted = match serde_json::to_string(&stored) {
            Ok(json) => self.storage.set(&key, &json).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(e) = persisted {
            log::warn!("Failed to cache {key}: {e}");
            return;
        }

        self.entries
            .write()
            .await
            .insert(dataset, CacheEntry::new(key, stored.data, timestamp));
    }

    /// Reloads every known dataset from storage, keeping only fresh entries,
    /// and returns them.
    pub async fn read_all(&self) -> BTreeMap<Dataset, Value> {
        let now = self.clock.now();
        let mut loaded = HashMap::new();
        for dataset in Dataset::ALL {
            if let Some(entry) = self.read_stored(dataset).await {
                if entry.is_fresh(now, self.ttl) {
                    loaded.insert(dataset, entry);
                } else {
                    log::debug!("Cached {} expired", entry.key);
                }
            }
        }

        let snapshot = loaded
            .iter()
            .map(|(dataset, entry)| (*dataset, entry.data.clone()))
            .collect();
        *self.entries.write().await = loaded;
        snapshot
    }

    async fn read_stored(&self, dataset: Dataset) -> Option<CacheEntry> {
        let key = self.scope.dataset_key(dataset);
        let json = match self.storage.get(&key).await {
            Ok(json) => json?,
            Err(e) => {
                log::warn!("Failed to read cached {key}: {e}");
                return None;
            }
        };
        match serde_json::from_str::<StoredEntry>(&json) {
            Ok(stored) => Some(CacheEntry::new(key, stored.data, stored.timestamp)),
            Err(e) => {
                log::warn!("Ignoring unreadable cache entry {key}: {e}");
                None
            }
        }
    }

    pub async fn get(&self, dataset: Dataset) -> Option<Value> {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(&dataset)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.data.clone())
    }

    pub async fn has_fresh(&self, dataset: Dataset) -> bool {
        self.get(dataset).await.is_some()
    }

    /// Cached data may stand in for live data only while offline.
    pub async fn is_available(&self, dataset: Dataset, online: bool) -> bool {
        online || self.has_fresh(dataset).await
    }

    pub async fn snapshot(&self) -> BTreeMap<Dataset, Value> {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .iter()
            .filter(|(_, entry)| entry.is_fresh(now, self.ttl))
            .map(|(dataset, entry)| (*dataset, entry.data.clone()))
            .collect()
    }

    /// Removes every dataset entry for the scope along with its durable
    /// pending-action record.
    pub async fn clear(&self) {
        let keys = Dataset::ALL
            .into_iter()
            .map(|dataset| self.scope.dataset_key(dataset))
            .chain(std::iter::once(self.scope.queue_key()));
        for key in keys {
            if let Err(e) = self.storage.remove(&key).await {
                log::warn!("Failed to remove cached {key}: {e}");
            }
        }
        self.entries.write().await.clear();
    }
}
