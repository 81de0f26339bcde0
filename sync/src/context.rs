use std::collections::BTreeMap;
use std::sync::Arc;

use database::{KeyValueStore, RemoteStore};
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use types::{Clock, Dataset, NewAction, PendingAction, SystemClock, TournamentId};

use crate::{
    ActionApplier, Connectivity, ConnectivityMonitor, DrainOutcome, LocalCache, Notifier,
    PendingQueue, Scope, SyncConfig, SyncCoordinator, SyncError, SyncEvent, Transition,
};

/// Where a submitted mutation ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    Applied,
    /// Queued because the client is offline.
    Queued(PendingAction),
    /// The direct write failed with `error` and the action was queued for
    /// replay. Part of it may already be stored; replay only finishes it.
    Deferred { action: PendingAction, error: String },
}

/// Everything a client holds for one tournament: the cache, the pending
/// queue, connectivity state and the coordinator that drains the queue.
pub struct OfflineContext {
    scope: Scope,
    monitor: ConnectivityMonitor,
    cache: LocalCache,
    queue: Arc<PendingQueue>,
    coordinator: SyncCoordinator,
    applier: ActionApplier,
    notifier: Notifier,
}

impl OfflineContext {
    pub fn new(
        tournament_id: TournamentId,
        initial: Connectivity,
        store: Arc<dyn RemoteStore>,
        storage: Arc<dyn KeyValueStore>,
        config: &SyncConfig,
    ) -> Self {
        Self::new_with_clock(
            tournament_id,
            initial,
            store,
            storage,
            config,
            Arc::new(SystemClock),
        )
    }

    pub fn new_with_clock(
        tournament_id: TournamentId,
        initial: Connectivity,
        store: Arc<dyn RemoteStore>,
        storage: Arc<dyn KeyValueStore>,
        config: &SyncConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let scope = Scope::new(tournament_id);
        let notifier = Notifier::new(config.event_capacity);
        let cache = LocalCache::new(scope, storage.clone(), clock.clone(), config.cache_ttl());
        let queue = Arc::new(PendingQueue::new(scope, storage, clock));
        let coordinator =
            SyncCoordinator::new(queue.clone(), store.clone(), config.replay, notifier.clone());
        Self {
            scope,
            monitor: ConnectivityMonitor::new(initial),
            cache,
            queue,
            coordinator,
            applier: ActionApplier::new(store),
            notifier,
        }
    }

    /// Loads the cached datasets and the pending queue left by earlier
    /// sessions. Returns the number of pending actions.
    pub async fn hydrate(&self) -> usize {
        let cached = self.cache.read_all().await;
        let pending = self.queue.load().await;
        log::info!(
            "Loaded {} cached datasets and {} pending actions for tournament {}",
            cached.len(),
            pending,
            self.scope.tournament_id()
        );
        pending
    }

    pub fn tournament_id(&self) -> TournamentId {
        self.scope.tournament_id()
    }

    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    pub fn is_syncing(&self) -> bool {
        self.coordinator.is_syncing()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.notifier.subscribe()
    }

    pub async fn cached_data(&self) -> BTreeMap<Dataset, Value> {
        self.cache.snapshot().await
    }

    pub async fn cache_write(&self, dataset: Dataset, data: Value) {
        self.cache.write(dataset, data).await
    }

    pub async fn get_cached(&self, dataset: Dataset) -> Option<Value> {
        self.cache.get(dataset).await
    }

    pub async fn is_data_available(&self, dataset: Dataset) -> bool {
        self.cache.is_available(dataset, self.is_online()).await
    }

    pub async fn enqueue_action(&self, action: NewAction) -> PendingAction {
        let pending = self.queue.enqueue(action).await;
        self.notifier.emit(SyncEvent::QueuedForSync {
            action_id: pending.id,
            kind: pending.kind,
        });
        pending
    }

    pub async fn pending_actions(&self) -> Vec<PendingAction> {
        self.queue.snapshot().await
    }

    /// Applies `action` straight away when online, queueing it instead when
    /// offline. A failed direct write is reported back with the queued copy.
    pub async fn submit(&self, action: NewAction) -> Submitted {
        if !self.is_online() {
            return Submitted::Queued(self.enqueue_action(action).await);
        }
        match self
            .applier
            .apply(action.kind, &action.payload, action.target_id.as_deref())
            .await
        {
            Ok(()) => Submitted::Applied,
            Err(e) => {
                log::warn!("Direct {} failed, queueing for replay: {e}", action.kind);
                Submitted::Deferred {
                    action: self.enqueue_action(action).await,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Drains the queue now. Fails when offline; the caller decides whether
    /// to try again.
    pub async fn force_sync(&self) -> Result<DrainOutcome, SyncError> {
        if !self.is_online() {
            return Err(SyncError::Offline);
        }
        Ok(self.drain().await)
    }

    pub async fn drain(&self) -> DrainOutcome {
        self.coordinator.drain(self.monitor.current()).await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        self.queue.clear().await;
        log::info!("Cleared offline data for tournament {}", self.tournament_id());
        self.notifier.emit(SyncEvent::CacheCleared);
    }

    /// Feeds one platform reachability signal through the state machine.
    /// Coming back online triggers exactly one drain.
    pub async fn handle_signal(&self, signal: Connectivity) -> Option<Transition> {
        let transition = self.monitor.observe(signal)?;
        match transition {
            Transition::Reconnected => {
                log::info!("Back online");
                self.notifier.emit(SyncEvent::Reconnected);
                self.drain().await;
            }
            Transition::Disconnected => {
                log::info!("Working offline");
                self.notifier.emit(SyncEvent::Disconnected);
            }
        }
        Some(transition)
    }

    /// Follows the signal channel until its sender is dropped.
    pub async fn run_connectivity(&self, mut signals: watch::Receiver<Connectivity>) {
        let initial = *signals.borrow_and_update();
        self.handle_signal(initial).await;
        while signals.changed().await.is_ok() {
            let signal = *signals.borrow_and_update();
            self.handle_signal(signal).await;
        }
        log::debug!("Connectivity signal closed");
    }
}
