//! mig-core - Core library for mig
//!
//! This crate provides migration naming, configuration parsing, multi-source
//! migration discovery, the unit registry, and the runner that applies and
//! reverts migrations against a history store.

pub mod config;
pub mod discovery;
pub mod error;
pub mod history;
pub mod identifier;
mod newtype_string;
pub mod registry;
pub mod runner;
pub mod sources;
pub mod sql_unit;
pub mod unit;

pub use config::{Config, DatabaseConfig};
pub use discovery::{MigrationDiscovery, MigrationSource};
pub use error::{CoreError, CoreResult};
pub use history::{HistoryRecord, HistoryStore};
pub use identifier::{
    applied_versions, AppliedSet, MigrationId, MigrationPattern, VersionKey, BASE_MIGRATION,
};
pub use registry::{NamedUnit, UnitLoadError, UnitLoader, UnitRegistry};
pub use runner::{create_migration, MigrationFailure, MigrationRunner, RunReport};
pub use sources::{ExtendedPath, PathResolver, SourceList};
pub use sql_unit::{SqlFileLoader, SqlMigration};
pub use unit::{BoundMigration, Direction, ExecError, MigrationUnit, SqlExecutor};
