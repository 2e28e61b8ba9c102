use std::sync::PoisonError;
use thiserror::Error;
use crate::database::DatabaseError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique constraint violated (e.g. email already registered)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Blocking task failed to complete
    #[error("Storage task failed: {0}")]
    Task(String),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),

    /// Not found error
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(error: rusqlite::Error) -> Self {
        // Surface UNIQUE violations as conflicts so callers can report them
        if let rusqlite::Error::SqliteFailure(ref failure, ref message) = error {
            if failure.code == rusqlite::ErrorCode::ConstraintViolation {
                let detail = message.clone().unwrap_or_else(|| "constraint violation".to_string());
                return RepositoryError::Conflict(detail);
            }
        }
        RepositoryError::Sqlite(error)
    }
}

impl From<tokio::task::JoinError> for RepositoryError {
    fn from(error: tokio::task::JoinError) -> Self {
        RepositoryError::Task(error.to_string())
    }
}
