//! Migration history table.
//!
//! Applied migrations are rows of `<table> (version, apply_time)`. A fresh
//! table is seeded with the base record so that it is never empty.

use crate::connection::MigrationDb;
use crate::error::{DbError, DbResult};
use chrono::Utc;
use duckdb::Connection;
use mig_core::{
    applied_versions, AppliedSet, CoreResult, HistoryRecord, HistoryStore, MigrationId,
    BASE_MIGRATION,
};

/// Create the history table if needed and seed the base record.
pub(crate) fn ensure_history_table(conn: &Connection, table: &str) -> DbResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
             version    VARCHAR PRIMARY KEY,
             apply_time BIGINT
         );"
    ))
    .map_err(|e| DbError::HistoryError(format!("failed to create table {table}: {e}")))?;

    let rows: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .map_err(|e| DbError::HistoryError(format!("failed to read table {table}: {e}")))?;
    if rows == 0 {
        log::debug!("Creating migration history table {}", table);
        conn.execute(
            &format!("INSERT INTO {table} (version, apply_time) VALUES (?, ?)"),
            duckdb::params![BASE_MIGRATION, Utc::now().timestamp()],
        )
        .map_err(|e| DbError::HistoryError(format!("failed to seed table {table}: {e}")))?;
    }
    Ok(())
}

impl MigrationDb {
    /// Every recorded migration name, the base record included.
    pub fn recorded_versions(&self) -> DbResult<Vec<String>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT version FROM {} ORDER BY version", self.table()))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut versions = Vec::new();
        for row in rows {
            versions.push(row?);
        }
        Ok(versions)
    }

    /// History rows newest first, without the base record.
    pub fn history_records(&self, limit: Option<usize>) -> DbResult<Vec<HistoryRecord>> {
        let mut sql = format!(
            "SELECT version, apply_time FROM {} WHERE version <> ? \
             ORDER BY apply_time DESC, version DESC",
            self.table()
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(duckdb::params![BASE_MIGRATION], |row| {
            Ok(HistoryRecord {
                version: row.get(0)?,
                apply_time: row.get(1)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Insert a history row for `id` stamped with the current time.
    pub fn insert_record(&self, id: &MigrationId) -> DbResult<()> {
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO {} (version, apply_time) VALUES (?, ?)",
                    self.table()
                ),
                duckdb::params![id.as_str(), Utc::now().timestamp()],
            )
            .map_err(|e| DbError::HistoryError(format!("failed to record {id}: {e}")))?;
        Ok(())
    }

    /// Delete the history row for `id`.
    pub fn delete_record(&self, id: &MigrationId) -> DbResult<()> {
        self.conn()
            .execute(
                &format!("DELETE FROM {} WHERE version = ?", self.table()),
                duckdb::params![id.as_str()],
            )
            .map_err(|e| DbError::HistoryError(format!("failed to remove {id}: {e}")))?;
        Ok(())
    }
}

impl HistoryStore for MigrationDb {
    fn applied_versions(&self) -> CoreResult<AppliedSet> {
        let recorded = self.recorded_versions()?;
        Ok(applied_versions(recorded.iter().map(String::as_str)))
    }

    fn history(&self, limit: Option<usize>) -> CoreResult<Vec<HistoryRecord>> {
        Ok(self.history_records(limit)?)
    }

    fn record_applied(&self, id: &MigrationId) -> CoreResult<()> {
        Ok(self.insert_record(id)?)
    }

    fn remove(&self, id: &MigrationId) -> CoreResult<()> {
        Ok(self.delete_record(id)?)
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
