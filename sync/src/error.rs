use database::DatabaseError;
use thiserror::Error;
use types::ActionKind;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Cannot sync while offline")]
    Offline,

    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0} action is missing target id")]
    MissingTarget(ActionKind),

    #[error("Configuration error: {0}")]
    Config(String),
}
