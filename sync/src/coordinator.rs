use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use database::{RemoteStore, ResultService};
use serde_json::Value;
use types::{ActionKind, MatchResult, PendingAction};

use crate::{Connectivity, Notifier, PendingQueue, ReplayPolicy, SyncError, SyncEvent};

/// Applies one mutation to the remote store. Result mutations go through
/// [`ResultService`] so they trigger recomputation exactly as online edits do.
pub struct ActionApplier {
    store: Arc<dyn RemoteStore>,
    results: ResultService,
}

impl ActionApplier {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            results: ResultService::new(store.clone()),
            store,
        }
    }

    pub async fn apply(
        &self,
        kind: ActionKind,
        payload: &Value,
        target_id: Option<&str>,
    ) -> Result<(), SyncError> {
        match kind {
            ActionKind::AddResult => {
                let result: MatchResult = serde_json::from_value(payload.clone())?;
                self.results.add_result(&result).await?;
            }
            ActionKind::UpdateResult => {
                let id = target_id.ok_or(SyncError::MissingTarget(kind))?;
                self.results.update_result_raw(id, payload.clone()).await?;
            }
            ActionKind::AddAnnouncement => {
                self.store.insert(kind.collection(), payload.clone()).await?;
            }
            ActionKind::UpdatePlayerStatus => {
                let id = target_id.ok_or(SyncError::MissingTarget(kind))?;
                self.store
                    .update(kind.collection(), id, payload.clone())
                    .await?;
            }
        }
        Ok(())
    }

    pub async fn apply_pending(&self, action: &PendingAction) -> Result<(), SyncError> {
        self.apply(action.kind, &action.payload, action.target_id.as_deref())
            .await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedAction {
    /// The action with `attempts` counting this failure.
    pub action: PendingAction,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrainReport {
    pub applied: Vec<i64>,
    /// Put back on the queue for the next drain.
    pub retained: Vec<FailedAction>,
    /// Given up on.
    pub dropped: Vec<FailedAction>,
}

impl DrainReport {
    pub fn failed(&self) -> usize {
        self.retained.len() + self.dropped.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrainOutcome {
    Offline,
    AlreadySyncing,
    Empty,
    Completed(DrainReport),
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Replays the pending queue against the remote store, one drain at a time.
pub struct SyncCoordinator {
    queue: Arc<PendingQueue>,
    applier: ActionApplier,
    policy: ReplayPolicy,
    syncing: AtomicBool,
    notifier: Notifier,
}

impl SyncCoordinator {
    pub fn new(
        queue: Arc<PendingQueue>,
        store: Arc<dyn RemoteStore>,
        policy: ReplayPolicy,
        notifier: Notifier,
    ) -> Self {
        Self {
            queue,
            applier: ActionApplier::new(store),
            policy,
            syncing: AtomicBool::new(false),
            notifier,
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::SeqCst)
    }

    /// Replays every queued action in order. Does nothing while offline or
    /// while another drain is running.
    pub async fn drain(&self, connectivity: Connectivity) -> DrainOutcome {
        if !connectivity.is_online() {
            log::debug!("Skipping sync while offline");
            return DrainOutcome::Offline;
        }
        let Some(_in_flight) = InFlight::acquire(&self.syncing) else {
            log::debug!("Sync already in progress");
            return DrainOutcome::AlreadySyncing;
        };
        self.replay().await
    }

    async fn replay(&self) -> DrainOutcome {
        let actions = self.queue.load_for_replay().await;
        if actions.is_empty() {
            return DrainOutcome::Empty;
        }

        log::info!("Syncing {} pending actions", actions.len());
        self.notifier.emit(SyncEvent::SyncStarted {
            pending: actions.len(),
        });

        let processed: Vec<i64> = actions.iter().map(|a| a.id).collect();
        let mut report = DrainReport::default();
        for action in actions {
            match self.applier.apply_pending(&action).await {
                Ok(()) => {
                    log::debug!("Synced {action}");
                    report.applied.push(action.id);
                }
                Err(e) => {
                    log::warn!("Failed to sync {action}: {e}");
                    self.record_failure(&mut report, action, e);
                }
            }
        }

        let retained = report
            .retained
            .iter()
            .map(|failed| failed.action.clone())
            .collect();
        self.queue.settle(&processed, retained).await;
        self.announce(&report);
        DrainOutcome::Completed(report)
    }

    fn record_failure(&self, report: &mut DrainReport, mut action: PendingAction, error: SyncError) {
        action.attempts += 1;
        let failed = FailedAction {
            action,
            error: error.to_string(),
        };
        match self.policy {
            ReplayPolicy::Requeue { max_attempts } if failed.action.attempts < max_attempts => {
                report.retained.push(failed)
            }
            _ => report.dropped.push(failed),
        }
    }

    fn announce(&self, report: &DrainReport) {
        if report.is_clean() {
            log::info!("Synced {} actions", report.applied.len());
            self.notifier.emit(SyncEvent::SyncCompleted {
                applied: report.applied.len(),
            });
            return;
        }

        log::warn!(
            "Sync finished with {} failures ({} will be retried, {} dropped)",
            report.failed(),
            report.retained.len(),
            report.dropped.len()
        );
        self.notifier.emit(SyncEvent::SyncFailed {
            applied: report.applied.len(),
            failed: report.failed(),
        });
        if matches!(self.policy, ReplayPolicy::Requeue { .. }) && !report.dropped.is_empty() {
            self.notifier.emit(SyncEvent::ActionsDropped {
                actions: report.dropped.clone(),
            });
        }
    }
}
