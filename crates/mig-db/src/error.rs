//! Error types for the DuckDB backend.

use mig_core::CoreError;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open or create the database (D001).
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Migration history table could not be read or written (D003).
    #[error("[D003] Migration history failed: {0}")]
    HistoryError(String),

    /// DuckDB driver error with preserved source chain (D004).
    #[error("[D004] DuckDB error")]
    DuckDb(#[source] duckdb::Error),
}

/// Result type alias for [`DbError`].
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::DuckDb(err)
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DuckDb(source) => CoreError::History(format!("DuckDB error: {source}")),
            other => CoreError::History(other.to_string()),
        }
    }
}
