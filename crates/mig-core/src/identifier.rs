//! Migration naming and versioning.
//!
//! A migration is identified by its file stem, `m<yymmdd>_<hhmmss>_<description>`.
//! The twelve digits (with the separating underscore) form the [`VersionKey`],
//! which is what the history store records as "applied".

use crate::error::{CoreError, CoreResult};
use crate::newtype_string::define_validated_string;
use regex::Regex;
use std::collections::BTreeSet;

/// Length of a version key: `dddddd_dddddd`.
const VERSION_KEY_LEN: usize = 13;

/// Identifier recorded for the seeded history row.
pub const BASE_MIGRATION: &str = "m000000_000000_base";

/// Version key of [`BASE_MIGRATION`].
pub const BASE_VERSION: &str = "000000_000000";

define_validated_string! {
    /// Full migration name, e.g. `m240101_000000_create_users`.
    pub struct MigrationId;
    validate = validate_migration_id;
}

define_validated_string! {
    /// Timestamp-like version token, e.g. `240101_000000`.
    pub struct VersionKey;
    validate = validate_version_key;
}

/// Set of versions already recorded as executed.
pub type AppliedSet = BTreeSet<VersionKey>;

fn is_version_key(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == VERSION_KEY_LEN
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 6 { *b == b'_' } else { b.is_ascii_digit() })
}

fn validate_version_key(s: &str) -> Result<(), String> {
    if is_version_key(s) {
        Ok(())
    } else {
        Err("expected a version of the form yymmdd_hhmmss".to_string())
    }
}

fn validate_migration_id(s: &str) -> Result<(), String> {
    let Some(rest) = s.strip_prefix('m') else {
        return Err("must start with 'm'".to_string());
    };
    if rest.len() <= VERSION_KEY_LEN || !rest.is_char_boundary(VERSION_KEY_LEN) {
        return Err("expected m<yymmdd>_<hhmmss>_<description>".to_string());
    }
    let (version, tail) = rest.split_at(VERSION_KEY_LEN);
    if !is_version_key(version) || !tail.starts_with('_') {
        return Err("expected m<yymmdd>_<hhmmss>_<description>".to_string());
    }
    Ok(())
}

impl MigrationId {
    /// The version key embedded in this identifier.
    pub fn version(&self) -> VersionKey {
        VersionKey(self.0[1..=VERSION_KEY_LEN].to_string())
    }

    /// The free-form description following the version key.
    pub fn description(&self) -> &str {
        &self.0[VERSION_KEY_LEN + 2..]
    }

    /// Whether this is the seeded base record of the history table.
    pub fn is_base(&self) -> bool {
        self.0 == BASE_MIGRATION
    }
}

impl VersionKey {
    /// Parse an operator-supplied target: a full identifier, a version key,
    /// or either of those with the leading `m` omitted/added.
    ///
    /// Accepts `m240101_000000_init`, `m240101_000000`, `240101_000000` and
    /// `240101_000000_init`.
    pub fn from_target(target: &str) -> CoreResult<Self> {
        let trimmed = target.trim();
        let body = trimmed.strip_prefix('m').unwrap_or(trimmed);
        let candidate = body.get(..VERSION_KEY_LEN).unwrap_or(body);
        let tail = body.get(VERSION_KEY_LEN..).unwrap_or("");
        if is_version_key(candidate) && (tail.is_empty() || tail.starts_with('_')) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(CoreError::InvalidMigrationName {
                name: target.to_string(),
                reason: "expected a migration name or a version of the form yymmdd_hhmmss"
                    .to_string(),
            })
        }
    }
}

/// Matches migration file names for a given unit file extension.
///
/// The pattern is `^(m([0-9]{6}_[0-9]{6})_.*?)\.<ext>$`: group 1 is the
/// identifier (file name without extension), group 2 the version key. Only
/// ASCII digits form a version.
#[derive(Debug, Clone)]
pub struct MigrationPattern {
    regex: Regex,
    extension: String,
}

impl MigrationPattern {
    /// Build the pattern for files ending in `.<extension>`.
    pub fn new(extension: &str) -> CoreResult<Self> {
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migration file extension cannot be empty".to_string(),
            });
        }
        let regex = Regex::new(&format!(
            r"^(m([0-9]{{6}}_[0-9]{{6}})_.*?)\.{}$",
            regex::escape(extension)
        ))
        .map_err(|e| CoreError::ConfigInvalid {
            message: format!("invalid migration file extension '{extension}': {e}"),
        })?;
        Ok(Self {
            regex,
            extension: extension.to_string(),
        })
    }

    /// The unit file extension, without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Extract the identifier from a file name, or `None` if it does not match.
    pub fn match_file_name(&self, file_name: &str) -> Option<MigrationId> {
        let caps = self.regex.captures(file_name)?;
        caps.get(1)
            .and_then(|m| MigrationId::parse(m.as_str()).ok())
    }

    /// File name a migration with this identifier would have.
    pub fn file_name(&self, id: &MigrationId) -> String {
        format!("{}.{}", id, self.extension)
    }
}

/// Collect the versions of a set of recorded migration names.
///
/// Names that do not follow the naming convention carry no version and are
/// skipped.
pub fn applied_versions<'a, I>(recorded: I) -> AppliedSet
where
    I: IntoIterator<Item = &'a str>,
{
    recorded
        .into_iter()
        .filter_map(|name| MigrationId::parse(name).ok())
        .map(|id| id.version())
        .collect()
}

#[cfg(test)]
#[path = "identifier_test.rs"]
mod tests;
