//! Migration units and the connection they run against.
//!
//! A unit knows how to apply (`up`) and revert (`down`) one migration. It does
//! not own a connection; [`BoundMigration`] pairs a constructed unit with the
//! caller's [`SqlExecutor`] so the runner can execute it.

use crate::error::{CoreError, CoreResult};
use crate::identifier::MigrationId;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure reported by an executor or a unit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ExecError(pub String);

/// Database connection as seen by migration units.
pub trait SqlExecutor {
    /// Execute one or more SQL statements.
    fn execute_batch(&self, sql: &str) -> Result<(), ExecError>;
}

/// A single migration.
pub trait MigrationUnit {
    /// Apply the migration.
    fn up(&self, conn: &dyn SqlExecutor) -> Result<(), ExecError>;

    /// Revert the migration.
    fn down(&self, conn: &dyn SqlExecutor) -> Result<(), ExecError>;

    /// Whether [`down`](Self::down) is supported.
    fn is_reversible(&self) -> bool {
        true
    }
}

/// Which way a migration is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A constructed unit bound to a connection, ready to run.
pub struct BoundMigration<'c> {
    id: MigrationId,
    path: PathBuf,
    unit: Box<dyn MigrationUnit>,
    conn: &'c dyn SqlExecutor,
}

impl<'c> BoundMigration<'c> {
    /// Bind `unit`, loaded from `path`, to `conn`.
    pub fn new(
        id: MigrationId,
        path: PathBuf,
        unit: Box<dyn MigrationUnit>,
        conn: &'c dyn SqlExecutor,
    ) -> Self {
        Self {
            id,
            path,
            unit,
            conn,
        }
    }

    /// Identifier the unit was resolved for.
    pub fn id(&self) -> &MigrationId {
        &self.id
    }

    /// File the unit was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the unit can be reverted.
    pub fn is_reversible(&self) -> bool {
        self.unit.is_reversible()
    }

    /// Run the unit in the given direction.
    pub fn run(&self, direction: Direction) -> CoreResult<()> {
        let result = match direction {
            Direction::Up => self.unit.up(self.conn),
            Direction::Down => {
                if !self.unit.is_reversible() {
                    return Err(CoreError::Irreversible {
                        name: self.id.to_string(),
                    });
                }
                self.unit.down(self.conn)
            }
        };
        result.map_err(|e| CoreError::Execution {
            name: self.id.to_string(),
            direction: direction.to_string(),
            message: e.0,
        })
    }

    /// Apply the unit.
    pub fn up(&self) -> CoreResult<()> {
        self.run(Direction::Up)
    }

    /// Revert the unit.
    pub fn down(&self) -> CoreResult<()> {
        self.run(Direction::Down)
    }
}

impl fmt::Debug for BoundMigration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMigration")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
