pub mod config;
pub mod error;
pub mod local;
pub mod models;
pub mod retry;
pub mod standings;
pub mod stores;

pub use config::DatabaseConfig;
pub use error::DatabaseError;
pub use local::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use models::TournamentPlayerRecord;
pub use retry::{retry_with_backoff, RetryConfig};
pub use standings::{ResultService, TournamentStats};
pub use stores::{Filter, MemoryStore, RemoteStore, SqliteStore};
