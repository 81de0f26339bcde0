use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::retry::{retry_with_backoff, RetryConfig};
use crate::DatabaseError;

pub const MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: 20,
        }
    }

    pub fn from_cli_or_env_or_yaml(cli_arg: Option<String>, yaml_config: Option<String>) -> Self {
        let url = if let Some(arg) = cli_arg {
            arg
        } else if let Ok(env) = std::env::var("DATABASE_URL") {
            env
        } else if let Some(yaml) = yaml_config {
            yaml
        } else {
            MEMORY_URL.to_string()
        };

        Self::new(url)
    }

    pub fn is_memory(&self) -> bool {
        self.url == ":memory:" || self.url.starts_with(MEMORY_URL)
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions, DatabaseError> {
        if self.is_memory() {
            return SqliteConnectOptions::from_str(MEMORY_URL)
                .map_err(|e| DatabaseError::Connection(e.to_string()));
        }
        let options = if self.url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(&self.url)
                .map_err(|e| DatabaseError::Connection(e.to_string()))?
        } else {
            SqliteConnectOptions::new().filename(&self.url)
        };
        Ok(options.create_if_missing(true))
    }

    pub async fn create_pool(&self) -> Result<SqlitePool, DatabaseError> {
        // Every connection to an in-memory database is a separate database.
        let max_connections = if self.is_memory() { 1 } else { self.pool_size };
        SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(self.connect_options()?)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))
    }

    pub async fn create_pool_with_retry(
        &self,
        retry: &RetryConfig,
    ) -> Result<SqlitePool, DatabaseError> {
        retry_with_backoff(move || self.create_pool(), retry)
            .await
            .map_err(|e| DatabaseError::RetryExhausted(format!("{}: {e}", self.url)))
    }
}
