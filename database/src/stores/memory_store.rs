use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use types::Collection;

use super::{empty_row, identify, merge_patch, Filter, RemoteStore};
use crate::DatabaseError;

/// In-process remote store for tests and dry runs. Can be switched
/// unavailable to simulate an outage, or told to refuse upcoming upserts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
    unavailable: AtomicBool,
    failing_upserts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Makes the next `count` upserts fail, leaving earlier writes in place.
    pub fn fail_upserts(&self, count: usize) {
        self.failing_upserts.store(count, Ordering::SeqCst);
    }

    fn take_upsert_failure(&self) -> bool {
        self.failing_upserts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn check_available(&self) -> Result<(), DatabaseError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    async fn write_merged(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
        create_missing: bool,
    ) -> Result<Value, DatabaseError> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let rows = collections.entry(collection).or_default();
        let position = rows.iter().position(|row| row_id(row) == Some(id));
        match position {
            Some(index) => {
                merge_patch(collection, &mut rows[index], &patch)?;
                Ok(rows[index].clone())
            }
            None if create_missing => {
                let mut row = empty_row(id);
                merge_patch(collection, &mut row, &patch)?;
                rows.push(row.clone());
                Ok(row)
            }
            None => Err(DatabaseError::RowNotFound {
                collection,
                id: id.to_string(),
            }),
        }
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, DatabaseError> {
        self.check_available()?;
        let (id, row) = identify(collection, row)?;
        let mut collections = self.collections.write().await;
        let rows = collections.entry(collection).or_default();
        if rows.iter().any(|existing| row_id(existing) == Some(id.as_str())) {
            return Err(DatabaseError::DuplicateRow { collection, id });
        }
        rows.push(row.clone());
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
        if self.take_upsert_failure() {
            return Err(DatabaseError::Unavailable(format!(
                "upsert of {collection}/{id} refused"
            )));
        }
        self.write_merged(collection, id, patch, true).await
    }

    async fn select(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, DatabaseError> {
        self.check_available()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|rows| rows.iter().filter(|row| filter.matches(row)).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_then_select_in_order() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Results, json!({"id": "r1", "tournament_id": 1}))
            .await
            .unwrap();
        store
            .insert(Collection::Results, json!({"id": "r2", "tournament_id": 2}))
            .await
            .unwrap();
        store
            .insert(Collection::Results, json!({"id": "r3", "tournament_id": 1}))
            .await
            .unwrap();

        let rows = store
            .select(Collection::Results, &Filter::eq("tournament_id", 1))
            .await
            .unwrap();
        let ids: Vec<&str> = rows.iter().filter_map(row_id).collect();
        assert_eq!(ids, vec!["r1", "r3"]);
    }

    #[tokio::test]
    async fn test_update_missing_row_fails() {
        let store = MemoryStore::new();
        let err = store
            .update(Collection::Results, "nope", json!({"score1": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::RowNotFound { .. }));
    }

    #[tokio::test]
    async fn test_upsert_creates_then_merges() {
        let store = MemoryStore::new();
        store
            .upsert(Collection::TournamentPlayers, "1:5", json!({"status": "active"}))
            .await
            .unwrap();
        let row = store
            .upsert(Collection::TournamentPlayers, "1:5", json!({"wins": 3}))
            .await
            .unwrap();
        assert_eq!(row, json!({"id": "1:5", "status": "active", "wins": 3}));
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Results, json!({"id": "r1"}))
            .await
            .unwrap();
        let err = store
            .insert(Collection::Results, json!({"id": "r1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::DuplicateRow { .. }));
    }

    #[tokio::test]
    async fn test_refused_upserts_run_out() {
        let store = MemoryStore::new();
        store.fail_upserts(1);
        assert!(store
            .upsert(Collection::TournamentPlayers, "1:1", json!({"wins": 1}))
            .await
            .is_err());
        assert!(store
            .upsert(Collection::TournamentPlayers, "1:1", json!({"wins": 1}))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unavailable_store_rejects_calls() {
        let store = MemoryStore::new();
        store.set_available(false);
        let err = store
            .select(Collection::Results, &Filter::all())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Unavailable(_)));

        store.set_available(true);
        assert!(store.select(Collection::Results, &Filter::all()).await.is_ok());
    }
}
