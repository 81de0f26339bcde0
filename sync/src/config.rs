use std::path::Path;

use database::RetryConfig;
use serde::Deserialize;

use crate::SyncError;

/// What a drain does with an action whose replay failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ReplayPolicy {
    /// Drop it after the pass. Nothing is retried.
    DiscardFailed,
    /// Put it back at the tail of the queue for the next drain, dropping it
    /// once it has failed `max_attempts` times.
    Requeue { max_attempts: u32 },
}

impl Default for ReplayPolicy {
    fn default() -> Self {
        ReplayPolicy::Requeue { max_attempts: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub cache_ttl_secs: i64,
    pub replay: ReplayPolicy,
    pub event_capacity: usize,
    pub database_url: Option<String>,
    pub local_storage_url: Option<String>,
    pub connect_retry: RetryConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 24 * 60 * 60,
            replay: ReplayPolicy::default(),
            event_capacity: 64,
            database_url: None,
            local_storage_url: None,
            connect_retry: RetryConfig::default(),
        }
    }
}

impl SyncConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SyncError> {
        serde_yaml::from_str(yaml).map_err(|e| SyncError::Config(e.to_string()))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs)
    }
}
