pub mod cache;
pub mod config;
pub mod connectivity;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod queue;
pub mod scope;

pub use cache::LocalCache;
pub use config::{ReplayPolicy, SyncConfig};
pub use connectivity::{Connectivity, ConnectivityMonitor, Transition};
pub use context::{OfflineContext, Submitted};
pub use coordinator::{ActionApplier, DrainOutcome, DrainReport, FailedAction, SyncCoordinator};
pub use error::SyncError;
pub use events::{Notifier, SyncEvent};
pub use queue::PendingQueue;
pub use scope::Scope;
