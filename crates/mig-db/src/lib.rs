//! DuckDB backend for mig.
//!
//! Provides [`MigrationDb`], a DuckDB connection that migration units run
//! against and that stores the migration history table.

pub mod connection;
pub mod error;
pub mod history;

pub use connection::MigrationDb;
pub use error::{DbError, DbResult};
