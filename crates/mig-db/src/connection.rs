//! Database connection wrapper.
//!
//! [`MigrationDb`] owns a DuckDB [`Connection`], makes sure the history table
//! exists, and executes migration SQL.

use crate::error::{DbError, DbResult};
use crate::history::ensure_history_table;
use duckdb::Connection;
use mig_core::{ExecError, SqlExecutor};
use std::path::Path;

/// DuckDB connection plus the name of its migration history table.
///
/// Single-threaded; migrations are applied sequentially.
pub struct MigrationDb {
    conn: Connection,
    table: String,
}

impl MigrationDb {
    /// Open (or create) the database at `path` with history in `table`.
    ///
    /// `:memory:` opens an in-memory database.
    pub fn open(path: &Path, table: &str) -> DbResult<Self> {
        if path.as_os_str() == ":memory:" {
            return Self::open_memory(table);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbError::ConnectionError(format!("{e}: {}", parent.display()))
            })?;
        }
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Self::with_connection(conn, table)
    }

    /// Create an in-memory database with an initialized history table.
    pub fn open_memory(table: &str) -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Self::with_connection(conn, table)
    }

    fn with_connection(conn: Connection, table: &str) -> DbResult<Self> {
        ensure_history_table(&conn, table)?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// Borrow the underlying DuckDB connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Name of the history table.
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl SqlExecutor for MigrationDb {
    fn execute_batch(&self, sql: &str) -> Result<(), ExecError> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| ExecError(e.to_string()))
    }
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
