//! Integration tests for the SQLite-backed stores and the result service.

use std::sync::Arc;

use database::{
    DatabaseConfig, DatabaseError, Filter, KeyValueStore, RemoteStore, ResultService,
    RetryConfig, SqliteKeyValueStore, SqliteStore,
};
use serde_json::json;
use types::{Collection, MatchResult, PlayerStats, ResultPatch};

async fn setup_test_db() -> sqlx::SqlitePool {
    let pool = DatabaseConfig::new("sqlite::memory:")
        .create_pool_with_retry(&RetryConfig::default())
        .await
        .expect("Failed to create test database pool");
    SqliteStore::new(pool.clone())
        .run_migrations()
        .await
        .expect("Failed to run test migrations");
    pool
}

#[tokio::test]
async fn test_insert_update_select_round_trip() {
    let store = SqliteStore::new(setup_test_db().await);

    let inserted = store
        .insert(
            Collection::Announcements,
            json!({"tournament_id": 3, "message": "Lunch break"}),
        )
        .await
        .expect("Failed to insert");
    let id = inserted["id"].as_str().expect("generated id").to_string();

    let updated = store
        .update(Collection::Announcements, &id, json!({"message": "Lunch over"}))
        .await
        .expect("Failed to update");
    assert_eq!(updated["message"], "Lunch over");
    assert_eq!(updated["tournament_id"], 3);

    let rows = store
        .select(Collection::Announcements, &Filter::eq("tournament_id", 3))
        .await
        .expect("Failed to select");
    assert_eq!(rows, vec![updated]);
}

#[tokio::test]
async fn test_duplicate_insert_is_rejected() {
    let store = SqliteStore::new(setup_test_db().await);
    let row = json!({"id": "r1", "tournament_id": 1});

    store
        .insert(Collection::Results, row.clone())
        .await
        .expect("first insert");
    let err = store.insert(Collection::Results, row).await.unwrap_err();
    assert!(matches!(err, DatabaseError::DuplicateRow { .. }));
}

#[tokio::test]
async fn test_update_missing_row() {
    let store = SqliteStore::new(setup_test_db().await);
    let err = store
        .update(Collection::TournamentPlayers, "9:9", json!({"status": "paused"}))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::RowNotFound { .. }));
}

#[tokio::test]
async fn test_collections_are_separate() {
    let store = SqliteStore::new(setup_test_db().await);
    store
        .insert(Collection::Players, json!({"id": "1", "name": "Ann"}))
        .await
        .unwrap();
    store
        .insert(Collection::Matches, json!({"id": "1", "round": 1}))
        .await
        .unwrap();

    let players = store
        .select(Collection::Players, &Filter::all())
        .await
        .unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0]["name"], "Ann");
}

#[tokio::test]
async fn test_result_service_over_sqlite() {
    let store: Arc<dyn RemoteStore> = Arc::new(SqliteStore::new(setup_test_db().await));
    let service = ResultService::new(store);

    let first = MatchResult::new(12, 1, (1, 420), (2, 390));
    service.add_result(&first).await.expect("add first");
    service
        .add_result(&MatchResult::new(12, 1, (3, 350), (4, 350)))
        .await
        .expect("add second");
    service
        .update_result(&first.id.to_string(), &ResultPatch::scores(380, 390))
        .await
        .expect("update first");

    let stored = service.stored_stats(12).await.expect("stored stats");
    assert_eq!(
        stored[&1],
        PlayerStats {
            wins: 0,
            losses: 1,
            ties: 0,
            spread: -10
        }
    );
    assert_eq!(stored[&3].ties, 1);
    assert_eq!(stored[&4].ties, 1);
    assert_eq!(service.results(12).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_key_value_store_overwrites_and_removes() {
    let kv = SqliteKeyValueStore::new(setup_test_db().await);

    assert_eq!(kv.get("tournament_1_results").await.unwrap(), None);
    kv.set("tournament_1_results", "[1]").await.unwrap();
    kv.set("tournament_1_results", "[1,2]").await.unwrap();
    assert_eq!(
        kv.get("tournament_1_results").await.unwrap().as_deref(),
        Some("[1,2]")
    );

    kv.remove("tournament_1_results").await.unwrap();
    assert_eq!(kv.get("tournament_1_results").await.unwrap(), None);
}
