//! Multi-source migration discovery and resolution.
//!
//! [`MigrationDiscovery`] scans the primary migration directory and every
//! extended directory for files named `m<yymmdd>_<hhmmss>_<description>.<ext>`,
//! and resolves an identifier back to a runnable unit by searching the same
//! directories in the same order.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::identifier::{AppliedSet, MigrationId, MigrationPattern};
use crate::registry::{select_unit_name, UnitLoader, UnitRegistry};
use crate::sources::{PathResolver, SourceList};
use crate::sql_unit::SqlFileLoader;
use crate::unit::{BoundMigration, SqlExecutor};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Where pending migrations come from and how they are turned into units.
///
/// The runner only talks to this trait, so any discovery strategy can be
/// plugged into it.
pub trait MigrationSource {
    /// Identifiers whose version is not in `applied`, sorted ascending.
    fn list_pending(&self, applied: &AppliedSet) -> CoreResult<Vec<MigrationId>>;

    /// Construct the unit for `id` and bind it to `conn`.
    fn resolve_migration<'c>(
        &mut self,
        id: &MigrationId,
        conn: &'c dyn SqlExecutor,
    ) -> CoreResult<BoundMigration<'c>>;
}

/// Discovery over a primary directory plus ordered extended directories.
pub struct MigrationDiscovery {
    sources: SourceList,
    pattern: MigrationPattern,
    loader: Box<dyn UnitLoader>,
    registry: UnitRegistry,
}

impl MigrationDiscovery {
    /// Create a discovery engine over `sources`.
    pub fn new(
        sources: SourceList,
        pattern: MigrationPattern,
        loader: impl UnitLoader + 'static,
    ) -> Self {
        Self {
            sources,
            pattern,
            loader: Box::new(loader),
            registry: UnitRegistry::new(),
        }
    }

    /// Build the engine a project configuration describes, using the SQL
    /// file loader. Extended paths are left unresolved.
    pub fn from_config(root: &Path, config: &Config) -> CoreResult<Self> {
        Ok(Self::new(
            SourceList::from_config(root, config),
            MigrationPattern::new(&config.extension)?,
            SqlFileLoader,
        ))
    }

    /// Resolve the extended directories in place. See [`SourceList::resolve_sources`].
    pub fn resolve_sources(&mut self, resolver: &PathResolver) -> CoreResult<()> {
        self.sources.resolve_sources(resolver)
    }

    /// The configured sources.
    pub fn sources(&self) -> &SourceList {
        &self.sources
    }

    /// The file name pattern.
    pub fn pattern(&self) -> &MigrationPattern {
        &self.pattern
    }

    /// Scan one directory, appending unapplied identifiers to `found`.
    ///
    /// Entries that are not files, or whose names do not match the pattern,
    /// are skipped.
    fn scan_source(
        &self,
        dir: &Path,
        applied: &AppliedSet,
        found: &mut Vec<MigrationId>,
    ) -> CoreResult<()> {
        log::debug!("Scanning migration source {}", dir.display());
        let read_err = |e: std::io::Error| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        };

        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                log::debug!("Skipping non UTF-8 file name {:?}", entry.path());
                continue;
            };
            let Some(id) = self.pattern.match_file_name(file_name) else {
                continue;
            };
            if !entry.path().is_file() {
                continue;
            }
            if !applied.contains(&id.version()) {
                found.push(id);
            }
        }
        Ok(())
    }

    /// List pending migrations across all sources.
    ///
    /// Scans the primary directory, then each extended directory in order,
    /// and sorts the combined result by identifier. The same identifier found
    /// in two sources is listed twice.
    ///
    /// # Errors
    ///
    /// [`CoreError::SourceNotFound`] if an extended directory has not been
    /// resolved (nothing is scanned in that case), or an IO error if a
    /// directory cannot be read.
    pub fn list_pending(&self, applied: &AppliedSet) -> CoreResult<Vec<MigrationId>> {
        let dirs = self.sources.directories()?;

        let mut pending = Vec::new();
        for dir in dirs {
            self.scan_source(dir, applied, &mut pending)?;
        }
        pending.sort();

        let mut seen = HashSet::new();
        for id in &pending {
            if !seen.insert(id.as_str()) {
                log::warn!("Migration {} exists in more than one source", id);
            }
        }

        Ok(pending)
    }

    /// Find the file for `id`: the primary directory first, then the extended
    /// directories in order.
    pub fn locate(&self, id: &MigrationId) -> CoreResult<PathBuf> {
        let file_name = self.pattern.file_name(id);
        self.sources
            .directories()?
            .into_iter()
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| CoreError::MigrationNotFound {
                name: id.to_string(),
            })
    }

    /// Resolve `id` to a unit bound to `conn`.
    ///
    /// The file is loaded through the registry (once per file). The unit
    /// registered under exactly `id` is preferred; otherwise the most recently
    /// defined name derived from `id` is used.
    ///
    /// # Errors
    ///
    /// [`CoreError::MigrationNotFound`] if no source holds the file,
    /// [`CoreError::MigrationLoad`] if the file cannot be loaded or defines
    /// no matching unit.
    pub fn resolve_migration<'c>(
        &mut self,
        id: &MigrationId,
        conn: &'c dyn SqlExecutor,
    ) -> CoreResult<BoundMigration<'c>> {
        let path = self.locate(id)?;
        let load_err = |reason: String| CoreError::MigrationLoad {
            name: id.to_string(),
            path: path.display().to_string(),
            reason,
        };

        let names = self
            .registry
            .load_file(&path, self.loader.as_ref())
            .map_err(|e| load_err(e.to_string()))?;
        let name = select_unit_name(names, id)
            .ok_or_else(|| {
                load_err(format!(
                    "file defines no unit named after the migration (found: {})",
                    if names.is_empty() {
                        "none".to_string()
                    } else {
                        names.join(", ")
                    }
                ))
            })?
            .to_string();
        let unit = self
            .registry
            .construct(&name)
            .ok_or_else(|| load_err(format!("unit '{name}' is not registered")))?;

        if name != id.as_str() {
            log::debug!("Resolved migration {} to unit {}", id, name);
        }
        Ok(BoundMigration::new(id.clone(), path, unit, conn))
    }
}

impl MigrationSource for MigrationDiscovery {
    fn list_pending(&self, applied: &AppliedSet) -> CoreResult<Vec<MigrationId>> {
        MigrationDiscovery::list_pending(self, applied)
    }

    fn resolve_migration<'c>(
        &mut self,
        id: &MigrationId,
        conn: &'c dyn SqlExecutor,
    ) -> CoreResult<BoundMigration<'c>> {
        MigrationDiscovery::resolve_migration(self, id, conn)
    }
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
