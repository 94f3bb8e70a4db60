//! Migration source directories.
//!
//! A [`SourceList`] holds the primary migration directory plus any extended
//! directories. Extended entries arrive as raw strings (relative, absolute,
//! or `@alias`-prefixed) and are normalized in place by
//! [`SourceList::resolve_sources`].

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// An extended migration directory, before or after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendedPath {
    /// Raw location as configured
    Unresolved(String),
    /// Canonical absolute directory
    Resolved(PathBuf),
}

impl ExtendedPath {
    /// The resolved directory, if resolution already happened.
    pub fn resolved(&self) -> Option<&Path> {
        match self {
            ExtendedPath::Resolved(path) => Some(path),
            ExtendedPath::Unresolved(_) => None,
        }
    }
}

/// Turns raw extended-path strings into absolute paths.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    root: PathBuf,
    aliases: HashMap<String, String>,
}

impl PathResolver {
    /// Create a resolver relative to `root` with the given alias table.
    pub fn new(root: impl Into<PathBuf>, aliases: HashMap<String, String>) -> Self {
        Self {
            root: root.into(),
            aliases,
        }
    }

    /// Build a resolver from a project root and its configuration.
    pub fn from_config(root: &Path, config: &Config) -> Self {
        Self::new(root, config.aliases.clone())
    }

    /// Resolve `raw` to an absolute path, or `None` if it names an unknown alias.
    ///
    /// The path is not required to exist.
    pub fn resolve(&self, raw: &str) -> Option<PathBuf> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let path = match raw.strip_prefix('@') {
            Some(aliased) => {
                let (alias, rest) = match aliased.find(['/', '\\']) {
                    Some(pos) => (
                        &aliased[..pos],
                        aliased[pos + 1..].trim_start_matches(['/', '\\']),
                    ),
                    None => (aliased, ""),
                };
                let base = self.absolute(Path::new(self.aliases.get(alias)?));
                if rest.is_empty() {
                    base
                } else {
                    base.join(rest)
                }
            }
            None => self.absolute(Path::new(raw)),
        };
        Some(path)
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Primary directory plus ordered extended directories.
#[derive(Debug, Clone)]
pub struct SourceList {
    primary: PathBuf,
    extended: Vec<ExtendedPath>,
}

impl SourceList {
    /// Create a source list with raw (unresolved) extended paths.
    pub fn new<I, S>(primary: impl Into<PathBuf>, extended: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            primary: primary.into(),
            extended: extended
                .into_iter()
                .map(|raw| ExtendedPath::Unresolved(raw.into()))
                .collect(),
        }
    }

    /// Build the source list described by a project configuration.
    pub fn from_config(root: &Path, config: &Config) -> Self {
        Self::new(
            config.migration_path_absolute(root),
            config.extended_migration_paths.iter().cloned(),
        )
    }

    /// The primary migration directory.
    pub fn primary(&self) -> &Path {
        &self.primary
    }

    /// Extended entries, in search order.
    pub fn extended(&self) -> &[ExtendedPath] {
        &self.extended
    }

    /// Whether every extended entry has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.extended.iter().all(|p| p.resolved().is_some())
    }

    /// Resolve every extended entry to an existing absolute directory.
    ///
    /// Entries already resolved are left untouched, so calling this again in
    /// the same invocation does no work. The primary path is not checked.
    ///
    /// # Errors
    ///
    /// [`CoreError::SourceNotFound`] naming the raw entry when it does not
    /// resolve or is not an existing directory. Entries before the failing
    /// one stay resolved.
    pub fn resolve_sources(&mut self, resolver: &PathResolver) -> CoreResult<()> {
        for entry in &mut self.extended {
            let raw = match entry {
                ExtendedPath::Unresolved(raw) => raw.clone(),
                ExtendedPath::Resolved(_) => continue,
            };
            let not_found = || CoreError::SourceNotFound { path: raw.clone() };
            let path = resolver.resolve(&raw).ok_or_else(not_found)?;
            if !path.is_dir() {
                return Err(not_found());
            }
            let path = path.canonicalize().map_err(|_| not_found())?;
            log::debug!("Resolved migration source {} -> {}", raw, path.display());
            *entry = ExtendedPath::Resolved(path);
        }
        Ok(())
    }

    /// All source directories in search order, primary first.
    ///
    /// # Errors
    ///
    /// [`CoreError::SourceNotFound`] for the first unresolved extended entry.
    pub fn directories(&self) -> CoreResult<Vec<&Path>> {
        let mut dirs = Vec::with_capacity(self.extended.len() + 1);
        dirs.push(self.primary.as_path());
        for entry in &self.extended {
            match entry {
                ExtendedPath::Resolved(path) => dirs.push(path.as_path()),
                ExtendedPath::Unresolved(raw) => {
                    return Err(CoreError::SourceNotFound { path: raw.clone() })
                }
            }
        }
        Ok(dirs)
    }
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
