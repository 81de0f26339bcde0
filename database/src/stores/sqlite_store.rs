use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use types::Collection;

use super::{empty_row, identify, merge_patch, Filter, RemoteStore};
use crate::DatabaseError;

/// Remote store backed by a single SQLite `records` table of JSON rows.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))
    }

    async fn write_merged(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
        create_missing: bool,
    ) -> Result<Value, DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        let existing = sqlx::query("SELECT body FROM records WHERE collection = ? AND id = ?")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let (mut row, exists) = match existing {
            Some(record) => {
                let body: String = record
                    .try_get("body")
                    .map_err(|e| DatabaseError::Query(e.to_string()))?;
                (serde_json::from_str::<Value>(&body)?, true)
            }
            None if create_missing => (empty_row(id), false),
            None => {
                return Err(DatabaseError::RowNotFound {
                    collection,
                    id: id.to_string(),
                })
            }
        };
        merge_patch(collection, &mut row, &patch)?;
        let body = serde_json::to_string(&row)?;

        let statement = if exists {
            "UPDATE records SET body = ?, updated_at = CURRENT_TIMESTAMP WHERE collection = ? AND id = ?"
        } else {
            "INSERT INTO records (body, collection, id) VALUES (?, ?, ?)"
        };
        sqlx::query(statement)
            .bind(body)
            .bind(collection.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
        Ok(row)
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, DatabaseError> {
        let (id, row) = identify(collection, row)?;
        let body = serde_json::to_string(&row)?;
        sqlx::query("INSERT INTO records (collection, id, body) VALUES (?, ?, ?)")
            .bind(collection.as_str())
            .bind(&id)
            .bind(body)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    DatabaseError::DuplicateRow {
                        collection,
                        id: id.clone(),
                    }
                }
                other => DatabaseError::Query(other.to_string()),
            })?;
        tracing::debug!("Inserted {collection}/{id}");
        Ok(row)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, DatabaseError> {
        self.write_merged(collection, id, patch, false).await
    }

    async fn upsert(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, DatabaseError> {
        self.write_merged(collection, id, patch, true).await
    }

    async fn select(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, DatabaseError> {
        let records = sqlx::query("SELECT body FROM records WHERE collection = ? ORDER BY seq")
            .bind(collection.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let body: String = record
                .try_get("body")
                .map_err(|e| DatabaseError::Query(e.to_string()))?;
            let row: Value = serde_json::from_str(&body)?;
            if filter.matches(&row) {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}
