//! SQL migration files.
//!
//! A SQL migration is split into sections by directive comments:
//!
//! ```sql
//! -- mig:unit app::m240101_000000_create_users
//! -- mig:up
//! CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR);
//! -- mig:down
//! DROP TABLE users;
//! ```
//!
//! `-- mig:unit` is optional and registers the unit under a different
//! (typically namespaced) name than the file stem. A file without a
//! `-- mig:down` section is irreversible; an empty one reverts as a no-op.

use crate::registry::{NamedUnit, UnitLoadError, UnitLoader};
use crate::unit::{ExecError, MigrationUnit, SqlExecutor};
use std::path::Path;

const DIRECTIVE_PREFIX: &str = "-- mig:";

/// Migration defined by plain SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlMigration {
    pub up: String,
    pub down: Option<String>,
}

impl MigrationUnit for SqlMigration {
    fn up(&self, conn: &dyn SqlExecutor) -> Result<(), ExecError> {
        conn.execute_batch(&self.up)
    }

    fn down(&self, conn: &dyn SqlExecutor) -> Result<(), ExecError> {
        match &self.down {
            Some(sql) if !sql.trim().is_empty() => conn.execute_batch(sql),
            Some(_) => Ok(()),
            None => Err(ExecError("migration has no down section".to_string())),
        }
    }

    fn is_reversible(&self) -> bool {
        self.down.is_some()
    }
}

/// Result of parsing a SQL migration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSqlFile {
    /// Name from `-- mig:unit`, if present
    pub unit_name: Option<String>,
    pub migration: SqlMigration,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Up,
    Down,
}

/// Parse the contents of a SQL migration file.
pub fn parse_sql_migration(content: &str) -> Result<ParsedSqlFile, UnitLoadError> {
    let mut unit_name: Option<String> = None;
    let mut up: Option<String> = None;
    let mut down: Option<String> = None;
    let mut section = Section::Preamble;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();

        if let Some(directive) = trimmed.strip_prefix(DIRECTIVE_PREFIX) {
            let mut parts = directive.split_whitespace();
            let keyword = parts.next().unwrap_or("");
            let argument = parts.next();
            let syntax = |message: String| UnitLoadError::Syntax {
                line: line_no,
                message,
            };
            match keyword {
                "unit" => {
                    if unit_name.is_some() {
                        return Err(syntax("duplicate -- mig:unit directive".to_string()));
                    }
                    let name = argument.ok_or_else(|| {
                        syntax("-- mig:unit requires a unit name".to_string())
                    })?;
                    if parts.next().is_some() {
                        return Err(syntax("-- mig:unit takes a single name".to_string()));
                    }
                    unit_name = Some(name.to_string());
                }
                "up" => {
                    if up.is_some() {
                        return Err(syntax("duplicate -- mig:up section".to_string()));
                    }
                    up = Some(String::new());
                    section = Section::Up;
                }
                "down" => {
                    if down.is_some() {
                        return Err(syntax("duplicate -- mig:down section".to_string()));
                    }
                    down = Some(String::new());
                    section = Section::Down;
                }
                other => {
                    return Err(syntax(format!("unknown directive '-- mig:{other}'")));
                }
            }
            continue;
        }

        let target = match section {
            Section::Up => up.as_mut(),
            Section::Down => down.as_mut(),
            Section::Preamble => {
                if trimmed.is_empty() || trimmed.starts_with("--") {
                    continue;
                }
                return Err(UnitLoadError::Syntax {
                    line: line_no,
                    message: "statement outside of a -- mig:up or -- mig:down section"
                        .to_string(),
                });
            }
        };
        if let Some(buffer) = target {
            buffer.push_str(line);
            buffer.push('\n');
        }
    }

    let up = up.ok_or_else(|| UnitLoadError::Invalid("missing -- mig:up section".to_string()))?;
    if up.trim().is_empty() {
        return Err(UnitLoadError::Invalid(
            "the -- mig:up section is empty".to_string(),
        ));
    }

    Ok(ParsedSqlFile {
        unit_name,
        migration: SqlMigration { up, down },
    })
}

/// Template written for a newly created migration.
pub fn sql_migration_template(name: &str) -> String {
    format!(
        "-- {name}\n\
         -- mig:up\n\
         \n\
         -- mig:down\n\
         \n"
    )
}

/// Loads `.sql` migration files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlFileLoader;

impl UnitLoader for SqlFileLoader {
    fn load(&self, path: &Path) -> Result<Vec<NamedUnit>, UnitLoadError> {
        let content = std::fs::read_to_string(path)?;
        let parsed = parse_sql_migration(&content)?;

        let name = match parsed.unit_name {
            Some(name) => name,
            None => path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| UnitLoadError::Invalid("invalid file name".to_string()))?
                .to_string(),
        };

        let migration = parsed.migration;
        Ok(vec![NamedUnit::new(name, move || {
            Box::new(migration.clone()) as Box<dyn MigrationUnit>
        })])
    }
}

#[cfg(test)]
#[path = "sql_unit_test.rs"]
mod tests;
