use thiserror::Error;
use types::Collection;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query execution error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Row not found: {collection}/{id}")]
    RowNotFound { collection: Collection, id: String },

    #[error("Duplicate row: {collection}/{id}")]
    DuplicateRow { collection: Collection, id: String },

    #[error("Invalid row for {0}: {1}")]
    InvalidRow(Collection, String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Retry exhausted: {0}")]
    RetryExhausted(String),
}
