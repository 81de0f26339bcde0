use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, data: serde_json::Value, timestamp: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            data,
            timestamp,
        }
    }

    /// An entry is fresh while its age is strictly below `ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.timestamp) < ttl
    }
}
