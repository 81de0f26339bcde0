use std::collections::HashSet;
use std::sync::Arc;

use database::{DatabaseError, KeyValueStore};
use tokio::sync::RwLock;
use types::{Clock, NewAction, PendingAction};

use crate::Scope;

#[derive(Default)]
struct QueueState {
    items: Vec<PendingAction>,
    last_id: i64,
}

/// Ordered list of mutations waiting to reach the remote store. The durable
/// record under [`Scope::queue_key`] is authoritative; the in-memory list
/// mirrors it after every change.
pub struct PendingQueue {
    scope: Scope,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    state: RwLock<QueueState>,
}

impl PendingQueue {
    pub fn new(scope: Scope, storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scope,
            storage,
            clock,
            state: RwLock::new(QueueState::default()),
        }
    }

    async fn read_durable(&self) -> Result<Vec<PendingAction>, DatabaseError> {
        match self.storage.get(&self.scope.queue_key()).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write_durable(&self, items: &[PendingAction]) -> Result<(), DatabaseError> {
        let key = self.scope.queue_key();
        if items.is_empty() {
            return self.storage.remove(&key).await;
        }
        let json = serde_json::to_string(items)?;
        self.storage.set(&key, &json).await
    }

    /// Replaces the in-memory list with the durable one. Returns the number of
    /// actions found.
    pub async fn load(&self) -> usize {
        let items = match self.read_durable().await {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Failed to load pending actions for {:?}: {e}", self.scope);
                Vec::new()
            }
        };
        let mut state = self.state.write().await;
        state.last_id = items.iter().map(|a| a.id).max().unwrap_or(0).max(state.last_id);
        state.items = items;
        state.items.len()
    }

    /// Stamps `action` with the next id and appends it. If the durable write
    /// fails the action is still kept in memory for this session.
    pub async fn enqueue(&self, action: NewAction) -> PendingAction {
        let mut state = self.state.write().await;
        let now = self.clock.now();
        let id = now.timestamp_millis().max(state.last_id + 1);
        state.last_id = id;

        let pending = PendingAction::stamp(action, id, now);
        state.items.push(pending.clone());
        if let Err(e) = self.write_durable(&state.items).await {
            log::warn!("Queued {pending} in memory only, durable write failed: {e}");
        } else {
            log::info!("Queued {pending} for later sync");
        }
        pending
    }

    pub async fn snapshot(&self) -> Vec<PendingAction> {
        self.state.read().await.items.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// The actions a drain should replay, in order: the durable list, followed
    /// by anything held only in memory because its durable write failed.
    pub async fn load_for_replay(&self) -> Vec<PendingAction> {
        let durable = self.read_durable().await;
        let state = self.state.read().await;
        match durable {
            Ok(mut items) => {
                let known: HashSet<i64> = items.iter().map(|a| a.id).collect();
                items.extend(
                    state
                        .items
                        .iter()
                        .filter(|a| !known.contains(&a.id))
                        .cloned(),
                );
                items
            }
            Err(e) => {
                log::warn!("Durable queue unreadable, replaying in-memory copy: {e}");
                state.items.clone()
            }
        }
    }

    /// Removes the `processed` actions and appends `retained` at the tail.
    /// Actions enqueued while the drain ran are left in place.
    pub async fn settle(&self, processed: &[i64], retained: Vec<PendingAction>) {
        let processed: HashSet<i64> = processed.iter().copied().collect();
        let mut state = self.state.write().await;
        state.items.retain(|a| !processed.contains(&a.id));
        state.items.extend(retained);
        if let Err(e) = self.write_durable(&state.items).await {
            log::warn!(
                "Failed to persist pending actions for {:?} after sync: {e}",
                self.scope
            );
        }
    }

    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.items.clear();
        if let Err(e) = self.storage.remove(&self.scope.queue_key()).await {
            log::warn!("Failed to remove pending actions for {:?}: {e}", self.scope);
        }
    }
}
