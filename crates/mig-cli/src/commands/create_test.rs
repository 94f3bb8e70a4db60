use super::*;
use crate::commands::common::ExitCode;
use std::fs;
use tempfile::tempdir;

fn global_for(project_dir: &std::path::Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: project_dir.display().to_string(),
        config: None,
        database: None,
        target: None,
    }
}

#[test]
fn test_create_writes_into_primary_directory() {
    let temp_dir = tempdir().unwrap();
    let project_path = temp_dir.path();
    fs::write(
        project_path.join("mig.yml"),
        "name: test_project\nmigration_path: db/migrations\n",
    )
    .unwrap();

    let args = CreateArgs {
        name: "create_users".to_string(),
    };
    execute(&args, &global_for(project_path)).unwrap();

    let created: Vec<String> = fs::read_dir(project_path.join("db/migrations"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(created.len(), 1);
    assert!(created[0].starts_with('m'));
    assert!(created[0].ends_with("_create_users.sql"));
}

#[test]
fn test_create_rejects_invalid_name() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("mig.yml"), "name: test_project\n").unwrap();

    let args = CreateArgs {
        name: "bad name".to_string(),
    };
    let err = execute(&args, &global_for(temp_dir.path())).unwrap_err();
    assert!(format!("{err:#}").contains("[E007]"));
}

#[test]
fn test_create_fails_on_missing_extended_directory() {
    let temp_dir = tempdir().unwrap();
    fs::write(
        temp_dir.path().join("mig.yml"),
        "name: test_project\nextended_migration_paths: missing/dir\n",
    )
    .unwrap();

    let args = CreateArgs {
        name: "create_users".to_string(),
    };
    let err = execute(&args, &global_for(temp_dir.path())).unwrap_err();
    assert!(matches!(err.downcast_ref::<ExitCode>(), Some(ExitCode(1))));
    assert!(!temp_dir.path().join("migrations").exists());
}
