use super::*;
use crate::identifier::{applied_versions, AppliedSet, BASE_MIGRATION};
use crate::sources::{PathResolver, SourceList};
use crate::sql_unit::SqlFileLoader;
use crate::unit::ExecError;
use chrono::TimeZone;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use tempfile::TempDir;

/// In-memory history with a clock that ticks on every insert.
struct FakeHistory {
    records: RefCell<Vec<HistoryRecord>>,
    clock: Cell<i64>,
}

impl FakeHistory {
    fn new() -> Self {
        Self {
            records: RefCell::new(vec![HistoryRecord {
                version: BASE_MIGRATION.to_string(),
                apply_time: 0,
            }]),
            clock: Cell::new(100),
        }
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .records
            .borrow()
            .iter()
            .filter(|r| !r.is_base())
            .map(|r| r.version.clone())
            .collect();
        names.sort();
        names
    }
}

impl HistoryStore for FakeHistory {
    fn applied_versions(&self) -> CoreResult<AppliedSet> {
        let records = self.records.borrow();
        Ok(applied_versions(records.iter().map(|r| r.version.as_str())))
    }

    fn history(&self, limit: Option<usize>) -> CoreResult<Vec<HistoryRecord>> {
        let mut records: Vec<HistoryRecord> = self
            .records
            .borrow()
            .iter()
            .filter(|r| !r.is_base())
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.apply_time
                .cmp(&a.apply_time)
                .then_with(|| b.version.cmp(&a.version))
        });
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    fn record_applied(&self, id: &MigrationId) -> CoreResult<()> {
        let mut records = self.records.borrow_mut();
        if records.iter().any(|r| r.version == id.as_str()) {
            return Err(CoreError::History(format!("{id} already recorded")));
        }
        self.clock.set(self.clock.get() + 1);
        records.push(HistoryRecord {
            version: id.to_string(),
            apply_time: self.clock.get(),
        });
        Ok(())
    }

    fn remove(&self, id: &MigrationId) -> CoreResult<()> {
        self.records
            .borrow_mut()
            .retain(|r| r.version != id.as_str());
        Ok(())
    }
}

/// Executor that records statements and fails on any containing `FAIL`.
#[derive(Default)]
struct RecordingExecutor {
    statements: RefCell<Vec<String>>,
}

impl RecordingExecutor {
    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.statements.borrow_mut())
    }
}

impl SqlExecutor for RecordingExecutor {
    fn execute_batch(&self, sql: &str) -> Result<(), ExecError> {
        let sql = sql.trim();
        if sql.contains("FAIL") {
            return Err(ExecError(format!("cannot execute: {sql}")));
        }
        self.statements.borrow_mut().push(sql.to_string());
        Ok(())
    }
}

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("migrations")).unwrap();
        std::fs::create_dir_all(dir.path().join("shared")).unwrap();
        Self { dir }
    }

    /// Write a migration whose up/down statements name it.
    fn migration(&self, source: &str, name: &str) {
        self.write(
            source,
            name,
            &format!("-- mig:up\nUP {name};\n-- mig:down\nDOWN {name};\n"),
        );
    }

    fn write(&self, source: &str, name: &str, content: &str) {
        std::fs::write(
            self.dir.path().join(source).join(format!("{name}.sql")),
            content,
        )
        .unwrap();
    }

    fn discovery(&self) -> MigrationDiscovery {
        let sources = SourceList::new(self.dir.path().join("migrations"), ["shared"]);
        let mut discovery =
            MigrationDiscovery::new(sources, MigrationPattern::new("sql").unwrap(), SqlFileLoader);
        discovery
            .resolve_sources(&PathResolver::new(self.dir.path(), HashMap::new()))
            .unwrap();
        discovery
    }
}

fn names(ids: &[MigrationId]) -> Vec<&str> {
    ids.iter().map(|id| id.as_str()).collect()
}

fn standard_project() -> Project {
    let project = Project::new();
    project.migration("migrations", "m240101_000000_a");
    project.migration("shared", "m240102_000000_b");
    project.migration("migrations", "m240103_000000_c");
    project
}

#[test]
fn test_up_applies_all_in_order() {
    let project = standard_project();
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);

    let report = runner.up(None).unwrap();
    assert!(report.is_success());
    assert_eq!(report.direction, Direction::Up);
    assert_eq!(
        names(&report.completed),
        vec!["m240101_000000_a", "m240102_000000_b", "m240103_000000_c"]
    );
    assert_eq!(
        conn.take(),
        vec![
            "UP m240101_000000_a;",
            "UP m240102_000000_b;",
            "UP m240103_000000_c;"
        ]
    );
    assert!(runner.pending().unwrap().is_empty());
}

#[test]
fn test_up_with_limit() {
    let project = standard_project();
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);

    let report = runner.up(Some(2)).unwrap();
    assert_eq!(
        names(&report.completed),
        vec!["m240101_000000_a", "m240102_000000_b"]
    );
    assert_eq!(names(&runner.pending().unwrap()), vec!["m240103_000000_c"]);
}

#[test]
fn test_zero_limit_is_rejected() {
    let project = standard_project();
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);

    assert!(matches!(
        runner.up(Some(0)),
        Err(CoreError::InvalidLimit { limit: 0 })
    ));
    assert!(matches!(
        runner.down(Some(0)),
        Err(CoreError::InvalidLimit { .. })
    ));
    assert!(matches!(
        runner.history(Some(0)),
        Err(CoreError::InvalidLimit { .. })
    ));
    assert!(conn.take().is_empty());
}

#[test]
fn test_up_stops_at_first_failure() {
    let project = standard_project();
    project.write(
        "shared",
        "m240102_000000_b",
        "-- mig:up\nFAIL;\n-- mig:down\nSELECT 1;\n",
    );
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);

    let report = runner.up(None).unwrap();
    assert!(!report.is_success());
    assert_eq!(names(&report.completed), vec!["m240101_000000_a"]);
    let failure = report.failure.unwrap();
    assert_eq!(failure.id, "m240102_000000_b");
    assert!(matches!(failure.error, CoreError::Execution { .. }));
    assert_eq!(history.names(), vec!["m240101_000000_a"]);
}

#[test]
fn test_up_skips_duplicate_across_sources() {
    let project = standard_project();
    project.migration("shared", "m240101_000000_a");
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);

    let report = runner.up(None).unwrap();
    assert!(report.is_success());
    assert_eq!(report.completed.len(), 3);
    assert_eq!(conn.take()[0], "UP m240101_000000_a;");
}

#[test]
fn test_down_reverts_newest_first() {
    let project = standard_project();
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);
    runner.up(None).unwrap();
    conn.take();

    let report = runner.down(None).unwrap();
    assert_eq!(names(&report.completed), vec!["m240103_000000_c"]);

    let report = runner.down(Some(5)).unwrap();
    assert_eq!(
        names(&report.completed),
        vec!["m240102_000000_b", "m240101_000000_a"]
    );
    assert_eq!(
        conn.take(),
        vec![
            "DOWN m240103_000000_c;",
            "DOWN m240102_000000_b;",
            "DOWN m240101_000000_a;"
        ]
    );
    assert!(history.names().is_empty());
    // The base row is never reverted
    assert!(runner.down(None).unwrap().is_empty());
    assert_eq!(history.records.borrow().len(), 1);
}

#[test]
fn test_down_irreversible_fails() {
    let project = Project::new();
    project.write("migrations", "m240101_000000_a", "-- mig:up\nUP a;\n");
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);
    runner.up(None).unwrap();

    let report = runner.down(None).unwrap();
    assert!(report.completed.is_empty());
    assert!(matches!(
        report.failure.map(|f| f.error),
        Some(CoreError::Irreversible { .. })
    ));
    assert_eq!(history.names(), vec!["m240101_000000_a"]);
}

#[test]
fn test_redo_reapplies_in_ascending_order() {
    let project = standard_project();
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);
    runner.up(None).unwrap();
    conn.take();

    let reports = runner.redo(Some(2)).unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(RunReport::is_success));
    assert_eq!(
        conn.take(),
        vec![
            "DOWN m240103_000000_c;",
            "DOWN m240102_000000_b;",
            "UP m240102_000000_b;",
            "UP m240103_000000_c;"
        ]
    );
    assert_eq!(history.names().len(), 3);
}

#[test]
fn test_to_pending_target_applies_through_it() {
    let project = standard_project();
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);

    let report = runner.to("240102_000000").unwrap();
    assert_eq!(
        names(&report.completed),
        vec!["m240101_000000_a", "m240102_000000_b"]
    );
}

#[test]
fn test_to_applied_target_reverts_newer() {
    let project = standard_project();
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);
    runner.up(None).unwrap();

    let report = runner.to("m240101_000000_a").unwrap();
    assert_eq!(report.direction, Direction::Down);
    assert_eq!(
        names(&report.completed),
        vec!["m240103_000000_c", "m240102_000000_b"]
    );

    // Already at the target
    assert!(runner.to("m240101_000000").unwrap().is_empty());
}

#[test]
fn test_to_base_reverts_everything() {
    let project = standard_project();
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);
    runner.up(None).unwrap();

    let report = runner.to("000000_000000").unwrap();
    assert_eq!(report.completed.len(), 3);
    assert!(history.names().is_empty());
}

#[test]
fn test_to_unknown_target() {
    let project = standard_project();
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);

    assert!(matches!(
        runner.to("m250101_000000_nope"),
        Err(CoreError::MigrationNotFound { .. })
    ));
    assert!(matches!(
        runner.to("latest"),
        Err(CoreError::InvalidMigrationName { .. })
    ));
}

#[test]
fn test_mark_moves_history_without_running() {
    let project = standard_project();
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);

    let report = runner.mark("m240102_000000_b").unwrap();
    assert_eq!(report.direction, Direction::Up);
    assert_eq!(history.names(), vec!["m240101_000000_a", "m240102_000000_b"]);

    let report = runner.mark("240101_000000").unwrap();
    assert_eq!(report.direction, Direction::Down);
    assert_eq!(names(&report.completed), vec!["m240102_000000_b"]);
    assert_eq!(history.names(), vec!["m240101_000000_a"]);

    assert!(conn.take().is_empty());
}

#[test]
fn test_history_newest_first() {
    let project = standard_project();
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let mut runner = MigrationRunner::new(project.discovery(), &history, &conn);
    runner.up(None).unwrap();

    let records = runner.history(Some(2)).unwrap();
    let versions: Vec<&str> = records.iter().map(|r| r.version.as_str()).collect();
    assert_eq!(versions, vec!["m240103_000000_c", "m240102_000000_b"]);
    assert_eq!(runner.history(None).unwrap().len(), 3);
}

#[test]
fn test_create_writes_template() {
    let dir = TempDir::new().unwrap();
    let primary = dir.path().join("db").join("migrations");
    let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
    let pattern = MigrationPattern::new("sql").unwrap();

    let path = create_migration(&primary, &pattern, "create_users", now).unwrap();
    assert_eq!(path, primary.join("m240305_140709_create_users.sql"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("-- m240305_140709_create_users\n"));

    // Same second, same name
    let err = create_migration(&primary, &pattern, "create_users", now).unwrap_err();
    assert!(matches!(err, CoreError::IoWithPath { .. }));
}

#[test]
fn test_create_rejects_bad_names() {
    let dir = TempDir::new().unwrap();
    let pattern = MigrationPattern::new("sql").unwrap();
    for name in ["", "create users", "../escape", "drop-table"] {
        let err = create_migration(dir.path(), &pattern, name, Utc::now()).unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidMigrationName { .. }),
            "{name:?} should be rejected"
        );
    }
}

#[test]
fn test_created_migration_is_pending() {
    let project = Project::new();
    let history = FakeHistory::new();
    let conn = RecordingExecutor::default();
    let runner = MigrationRunner::new(project.discovery(), &history, &conn);

    let path = runner.create("add_index").unwrap();
    assert!(path.starts_with(project.dir.path().join("migrations")));
    let pending = runner.pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert!(pending[0].as_str().ends_with("_add_index"));
}
