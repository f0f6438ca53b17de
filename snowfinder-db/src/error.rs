/// Error types for the storage layer
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// SQLite reported a failure
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    /// The statement was interrupted because its caller gave up
    #[error("query cancelled")]
    Cancelled,

    /// Failed to parse CSV seed data
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to read a seed file
    #[error("Failed to read seed data: {0}")]
    Io(#[from] std::io::Error),

    /// A seed row could not be stored
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Another thread panicked while holding the connection
    #[error("database connection poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::OperationInterrupted) => DbError::Cancelled,
            _ => DbError::Sqlite(err),
        }
    }
}

/// Type alias for Results using DbError
pub type Result<T> = std::result::Result<T, DbError>;
