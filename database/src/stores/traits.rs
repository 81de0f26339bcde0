use async_trait::async_trait;
use serde_json::Value;
use types::Collection;

use super::Filter;
use crate::DatabaseError;

/// Request/response access to the hosted tournament store. Rows are JSON
/// objects keyed by their `id` field within a collection.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Inserts a new row, assigning an `id` if it has none. Returns the stored
    /// row, or `DuplicateRow` if the id is taken.
    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, DatabaseError>;

    /// Merges `patch` into an existing row. Fails with `RowNotFound` if absent.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, DatabaseError>;

    /// Like `update`, but creates the row from `patch` when it does not exist.
    async fn upsert(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, DatabaseError>;

    /// Rows matching `filter`, in insertion order.
    async fn select(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, DatabaseError>;
}
