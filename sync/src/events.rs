use tokio::sync::broadcast;
use types::ActionKind;

use crate::coordinator::FailedAction;

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    QueuedForSync { action_id: i64, kind: ActionKind },
    Reconnected,
    Disconnected,
    SyncStarted { pending: usize },
    SyncCompleted { applied: usize },
    /// Aggregate "sync failed, will retry later".
    SyncFailed { applied: usize, failed: usize },
    /// Actions given up on for good, itemized.
    ActionsDropped { actions: Vec<FailedAction> },
    CacheCleared,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<SyncEvent>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: SyncEvent) {
        log::debug!("Sync event: {event:?}");
        if self.sender.send(event).is_err() {
            log::trace!("No listeners for sync events");
        }
    }
}
