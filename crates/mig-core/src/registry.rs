//! Named unit constructors.
//!
//! Loading a migration file registers one or more named constructors. The
//! resolver then picks the constructor for the requested identifier by name,
//! so nothing depends on the order files happen to be loaded in.

use crate::identifier::MigrationId;
use crate::unit::MigrationUnit;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Builds a fresh unit instance.
pub type UnitConstructor = Box<dyn Fn() -> Box<dyn MigrationUnit>>;

/// A constructor registered under a name by a loader.
pub struct NamedUnit {
    pub name: String,
    pub constructor: UnitConstructor,
}

impl NamedUnit {
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Box<dyn MigrationUnit> + 'static,
    {
        Self {
            name: name.into(),
            constructor: Box::new(constructor),
        }
    }
}

impl fmt::Debug for NamedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedUnit")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Why a loader could not produce units from a file.
#[derive(Error, Debug)]
pub enum UnitLoadError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("{0}")]
    Invalid(String),
}

/// Turns a migration file into named constructors.
pub trait UnitLoader {
    /// Read `path` and return the units it defines, in definition order.
    fn load(&self, path: &Path) -> Result<Vec<NamedUnit>, UnitLoadError>;
}

/// Registry of unit constructors, keyed by name.
///
/// Each file is loaded at most once; the names it defined are remembered so
/// a later resolution against the same file needs no reload.
#[derive(Default)]
pub struct UnitRegistry {
    constructors: HashMap<String, UnitConstructor>,
    loaded: HashMap<PathBuf, Vec<String>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor directly (for units compiled into the binary).
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn MigrationUnit> + 'static,
    {
        self.insert(NamedUnit::new(name, constructor));
    }

    fn insert(&mut self, unit: NamedUnit) {
        if self.constructors.contains_key(&unit.name) {
            log::warn!("Migration unit '{}' registered twice; keeping the latest", unit.name);
        }
        self.constructors.insert(unit.name, unit.constructor);
    }

    /// Whether a constructor is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Build a unit from the constructor registered under `name`.
    pub fn construct(&self, name: &str) -> Option<Box<dyn MigrationUnit>> {
        self.constructors.get(name).map(|ctor| ctor())
    }

    /// Whether `path` has already been loaded.
    pub fn is_loaded(&self, path: &Path) -> bool {
        self.loaded.contains_key(path)
    }

    /// Load `path` with `loader` unless it was loaded before, returning the
    /// names the file defined in definition order.
    pub fn load_file(
        &mut self,
        path: &Path,
        loader: &dyn UnitLoader,
    ) -> Result<&[String], UnitLoadError> {
        if !self.loaded.contains_key(path) {
            log::debug!("Loading migration file {}", path.display());
            let units = loader.load(path)?;
            let names: Vec<String> = units.iter().map(|u| u.name.clone()).collect();
            for unit in units {
                self.insert(unit);
            }
            self.loaded.insert(path.to_path_buf(), names);
        }
        Ok(self.loaded.get(path).map(Vec::as_slice).unwrap_or(&[]))
    }
}

/// Whether `name` is derived from `id`: it starts with the identifier, or
/// ends with it after a `::` or `\` namespace separator.
pub fn is_derived_name(name: &str, id: &str) -> bool {
    if name.starts_with(id) {
        return true;
    }
    name.strip_suffix(id)
        .is_some_and(|prefix| prefix.ends_with("::") || prefix.ends_with('\\'))
}

/// Pick the name to construct for `id` among the names a file defined.
///
/// An exact match wins; otherwise the most recently defined derived name.
pub fn select_unit_name<'a>(names: &'a [String], id: &MigrationId) -> Option<&'a str> {
    if let Some(exact) = names.iter().find(|n| n.as_str() == id.as_str()) {
        return Some(exact.as_str());
    }
    names
        .iter()
        .rev()
        .find(|n| is_derived_name(n, id))
        .map(String::as_str)
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
