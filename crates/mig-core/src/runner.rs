//! Applying, reverting and bookkeeping of migrations.
//!
//! [`MigrationRunner`] combines a [`MigrationSource`] (what exists), a
//! [`HistoryStore`] (what has run) and a [`SqlExecutor`] (where it runs).

use crate::discovery::{MigrationDiscovery, MigrationSource};
use crate::error::{CoreError, CoreResult};
use crate::history::{HistoryRecord, HistoryStore};
use crate::identifier::{MigrationId, MigrationPattern, VersionKey, BASE_VERSION};
use crate::sql_unit::sql_migration_template;
use crate::unit::{Direction, SqlExecutor};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A migration that stopped a run.
#[derive(Debug)]
pub struct MigrationFailure {
    pub id: MigrationId,
    pub error: CoreError,
}

/// Outcome of applying or reverting a batch of migrations.
///
/// Runs stop at the first failure; everything before it stays applied (or
/// reverted) and recorded.
#[derive(Debug)]
pub struct RunReport {
    pub direction: Direction,
    pub completed: Vec<MigrationId>,
    pub failure: Option<MigrationFailure>,
}

impl RunReport {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            completed: Vec::new(),
            failure: None,
        }
    }

    /// Whether every requested migration ran.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Whether nothing was requested.
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.failure.is_none()
    }
}

/// Runs migrations from a source against a connection, keeping history.
pub struct MigrationRunner<'c, S, H> {
    source: S,
    history: &'c H,
    conn: &'c dyn SqlExecutor,
}

fn check_limit(limit: Option<usize>) -> CoreResult<()> {
    match limit {
        Some(0) => Err(CoreError::InvalidLimit { limit: 0 }),
        _ => Ok(()),
    }
}

impl<'c, S: MigrationSource, H: HistoryStore> MigrationRunner<'c, S, H> {
    pub fn new(source: S, history: &'c H, conn: &'c dyn SqlExecutor) -> Self {
        Self {
            source,
            history,
            conn,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Pending migrations in the order they would be applied.
    ///
    /// An identifier present in several sources is listed once here.
    pub fn pending(&self) -> CoreResult<Vec<MigrationId>> {
        let applied = self.history.applied_versions()?;
        let mut pending = self.source.list_pending(&applied)?;
        pending.dedup();
        Ok(pending)
    }

    /// Most recent history records, newest first.
    pub fn history(&self, limit: Option<usize>) -> CoreResult<Vec<HistoryRecord>> {
        check_limit(limit)?;
        self.history.history(limit)
    }

    /// Apply the first `limit` pending migrations, or all of them.
    pub fn up(&mut self, limit: Option<usize>) -> CoreResult<RunReport> {
        check_limit(limit)?;
        let mut pending = self.pending()?;
        if let Some(limit) = limit {
            pending.truncate(limit);
        }
        Ok(self.apply_all(pending))
    }

    /// Revert the `limit` most recently applied migrations (one by default).
    pub fn down(&mut self, limit: Option<usize>) -> CoreResult<RunReport> {
        let limit = limit.unwrap_or(1);
        check_limit(Some(limit))?;
        let ids = self.applied_ids(Some(limit))?;
        Ok(self.revert_all(ids))
    }

    /// Revert the last `limit` migrations and apply them again.
    ///
    /// Returns the down report, followed by the up report when the down run
    /// succeeded.
    pub fn redo(&mut self, limit: Option<usize>) -> CoreResult<Vec<RunReport>> {
        let down = self.down(limit)?;
        if !down.is_success() || down.completed.is_empty() {
            return Ok(vec![down]);
        }
        let mut reapply = down.completed.clone();
        reapply.reverse();
        let up = self.apply_all(reapply);
        Ok(vec![down, up])
    }

    /// Migrate up or down so that `target` is the latest applied migration.
    ///
    /// `target` is a migration name or version. A pending target is applied
    /// along with everything before it; an applied target has everything
    /// after it reverted.
    pub fn to(&mut self, target: &str) -> CoreResult<RunReport> {
        let key = VersionKey::from_target(target)?;

        let pending = self.pending()?;
        if let Some(pos) = pending.iter().position(|id| id.version() == key) {
            let ids = pending[..=pos].to_vec();
            return Ok(self.apply_all(ids));
        }

        let applied = self.applied_ids(None)?;
        match position_in_history(&applied, &key) {
            Some(pos) => {
                if pos == 0 {
                    log::info!("Already at {}, nothing to do", target);
                }
                Ok(self.revert_all(applied[..pos].to_vec()))
            }
            None => Err(CoreError::MigrationNotFound {
                name: target.to_string(),
            }),
        }
    }

    /// Move the history to `target` without running any migration.
    ///
    /// Pending migrations up to and including `target` are recorded as
    /// applied; applied migrations newer than `target` are forgotten.
    pub fn mark(&mut self, target: &str) -> CoreResult<RunReport> {
        let key = VersionKey::from_target(target)?;

        let pending = self.pending()?;
        if let Some(pos) = pending.iter().position(|id| id.version() == key) {
            let mut report = RunReport::new(Direction::Up);
            for id in &pending[..=pos] {
                self.history.record_applied(id)?;
                log::info!("Marked {} as applied", id);
                report.completed.push(id.clone());
            }
            return Ok(report);
        }

        let applied = self.applied_ids(None)?;
        let pos = position_in_history(&applied, &key).ok_or_else(|| {
            CoreError::MigrationNotFound {
                name: target.to_string(),
            }
        })?;
        let mut report = RunReport::new(Direction::Down);
        for id in &applied[..pos] {
            self.history.remove(id)?;
            log::info!("Marked {} as not applied", id);
            report.completed.push(id.clone());
        }
        Ok(report)
    }

    fn applied_ids(&self, limit: Option<usize>) -> CoreResult<Vec<MigrationId>> {
        self.history
            .history(limit)?
            .iter()
            .map(HistoryRecord::migration_id)
            .collect()
    }

    fn apply_all(&mut self, ids: Vec<MigrationId>) -> RunReport {
        let mut report = RunReport::new(Direction::Up);
        for id in ids {
            match self.apply(&id) {
                Ok(()) => report.completed.push(id),
                Err(error) => {
                    log::error!("Failed to apply {}: {}", id, error);
                    report.failure = Some(MigrationFailure { id, error });
                    break;
                }
            }
        }
        report
    }

    fn revert_all(&mut self, ids: Vec<MigrationId>) -> RunReport {
        let mut report = RunReport::new(Direction::Down);
        for id in ids {
            match self.revert(&id) {
                Ok(()) => report.completed.push(id),
                Err(error) => {
                    log::error!("Failed to revert {}: {}", id, error);
                    report.failure = Some(MigrationFailure { id, error });
                    break;
                }
            }
        }
        report
    }

    fn apply(&mut self, id: &MigrationId) -> CoreResult<()> {
        let migration = self.source.resolve_migration(id, self.conn)?;
        migration.up()?;
        self.history.record_applied(id)?;
        log::info!("Applied {} ({})", id, migration.path().display());
        Ok(())
    }

    fn revert(&mut self, id: &MigrationId) -> CoreResult<()> {
        let migration = self.source.resolve_migration(id, self.conn)?;
        migration.down()?;
        self.history.remove(id)?;
        log::info!("Reverted {}", id);
        Ok(())
    }
}

/// Index of `key` in newest-first history. The base version points past the
/// end, so targeting it selects the whole history.
fn position_in_history(applied: &[MigrationId], key: &VersionKey) -> Option<usize> {
    if key == BASE_VERSION {
        return Some(applied.len());
    }
    applied.iter().position(|id| id.version() == *key)
}

impl<'c, H: HistoryStore> MigrationRunner<'c, MigrationDiscovery, H> {
    /// Create a new migration file in the primary directory.
    pub fn create(&self, name: &str) -> CoreResult<PathBuf> {
        create_migration(
            self.source.sources().primary(),
            self.source.pattern(),
            name,
            Utc::now(),
        )
    }
}

/// Write a new migration named `m<yymmdd_HHMMSS>_<name>` into `dir`.
///
/// The directory is created if missing. Existing files are never overwritten.
pub fn create_migration(
    dir: &Path,
    pattern: &MigrationPattern,
    name: &str,
    now: DateTime<Utc>,
) -> CoreResult<PathBuf> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CoreError::InvalidMigrationName {
            name: name.to_string(),
            reason: "only letters, digits and underscores are allowed".to_string(),
        });
    }
    let id = MigrationId::parse(format!("m{}_{}", now.format("%y%m%d_%H%M%S"), name))?;
    let path = dir.join(pattern.file_name(&id));
    let io_err = |e: std::io::Error| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    };

    std::fs::create_dir_all(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(io_err)?;
    file.write_all(sql_migration_template(id.as_str()).as_bytes())
        .map_err(io_err)?;

    log::info!("Created migration {}", path.display());
    Ok(path)
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
