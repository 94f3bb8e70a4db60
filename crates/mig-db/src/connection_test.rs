//! Tests for MigrationDb opening and execution.

use crate::MigrationDb;
use mig_core::SqlExecutor;

fn count(db: &MigrationDb, sql: &str) -> i64 {
    db.conn()
        .query_row(sql, [], |row| row.get::<_, i64>(0))
        .unwrap()
}

#[test]
fn open_memory_seeds_base_record() {
    let db = MigrationDb::open_memory("migration").unwrap();
    assert_eq!(count(&db, "SELECT COUNT(*) FROM migration"), 1);
    assert_eq!(
        count(
            &db,
            "SELECT COUNT(*) FROM migration WHERE version = 'm000000_000000_base'"
        ),
        1
    );
}

#[test]
fn open_memory_path_is_in_memory() {
    let db = MigrationDb::open(std::path::Path::new(":memory:"), "tbl_migration").unwrap();
    assert_eq!(db.table(), "tbl_migration");
    assert_eq!(count(&db, "SELECT COUNT(*) FROM tbl_migration"), 1);
}

#[test]
fn open_file_creates_database_and_parent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("target").join("app.duckdb");
    assert!(!path.exists());
    let _db = MigrationDb::open(&path, "migration").unwrap();
    assert!(path.exists());
}

#[test]
fn reopen_does_not_reseed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.duckdb");
    {
        let db = MigrationDb::open(&path, "migration").unwrap();
        db.execute_batch("INSERT INTO migration VALUES ('m240101_000000_init', 5)")
            .unwrap();
    }
    let db = MigrationDb::open(&path, "migration").unwrap();
    assert_eq!(count(&db, "SELECT COUNT(*) FROM migration"), 2);
}

#[test]
fn execute_batch_runs_multiple_statements() {
    let db = MigrationDb::open_memory("migration").unwrap();
    db.execute_batch("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1), (2);")
        .unwrap();
    assert_eq!(count(&db, "SELECT COUNT(*) FROM t"), 2);
}

#[test]
fn execute_batch_reports_errors() {
    let db = MigrationDb::open_memory("migration").unwrap();
    let err = db.execute_batch("SELECT * FROM missing_table").unwrap_err();
    assert!(err.0.contains("missing_table"), "{err}");
}
