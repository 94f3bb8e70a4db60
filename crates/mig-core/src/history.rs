//! Migration history storage.

use crate::error::CoreResult;
use crate::identifier::{AppliedSet, MigrationId, BASE_MIGRATION};
use serde::Serialize;

/// One row of the migration history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    /// Recorded migration name
    pub version: String,
    /// Unix timestamp (seconds) at which it was applied
    pub apply_time: i64,
}

impl HistoryRecord {
    /// Whether this is the seeded base row.
    pub fn is_base(&self) -> bool {
        self.version == BASE_MIGRATION
    }

    /// The recorded name as an identifier.
    pub fn migration_id(&self) -> CoreResult<MigrationId> {
        MigrationId::parse(self.version.as_str())
    }
}

/// Persistent record of which migrations have been applied.
pub trait HistoryStore {
    /// Versions of every recorded migration, the base row included.
    fn applied_versions(&self) -> CoreResult<AppliedSet>;

    /// Applied migrations, newest first, excluding the base row.
    ///
    /// Ordered by apply time, then by name. `None` returns everything.
    fn history(&self, limit: Option<usize>) -> CoreResult<Vec<HistoryRecord>>;

    /// Record `id` as applied now.
    fn record_applied(&self, id: &MigrationId) -> CoreResult<()>;

    /// Forget that `id` was applied.
    fn remove(&self, id: &MigrationId) -> CoreResult<()>;
}
