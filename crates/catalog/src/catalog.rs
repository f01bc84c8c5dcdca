//! Catalog - Resolved profiles addressable by key

use regex::Regex;
use shared::{RawProfile, Result, RollerError};
use std::collections::HashMap;
use std::sync::LazyLock;

static NAME_REPLACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-]").expect("valid name pattern"));

/// Replace every character outside `[A-Za-z0-9_-]` with `-`
pub fn sanitize(name: &str) -> String {
    NAME_REPLACE_RE.replace_all(name, "-").into_owned()
}

/// Key a profile is addressed by: `<sanitized name>/<role>`
pub fn catalog_key(profile: &RawProfile) -> String {
    format!("{}/{}", sanitize(&profile.name), profile.parameters.role)
}

/// A resolved profile and the source it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub profile: RawProfile,
    pub source_name: String,
}

/// Two sources disagreeing on the account behind one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    pub key: String,
    pub kept_account: String,
    pub kept_source: String,
    pub ignored_account: String,
    pub ignored_source: String,
}

/// Deduplicated mapping from key to resolved profile
///
/// Built fresh on every run and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
    conflicts: Vec<MergeConflict>,
}

impl Catalog {
    pub(crate) fn new(entries: HashMap<String, CatalogEntry>, conflicts: Vec<MergeConflict>) -> Self {
        Self { entries, conflicts }
    }

    /// Get a profile by key
    pub fn get(&self, key: &str) -> Option<&RawProfile> {
        self.entries.get(key).map(|e| &e.profile)
    }

    /// Get an entry by key, failing with a not-found error
    pub fn lookup(&self, key: &str) -> Result<&CatalogEntry> {
        self.entry(key).ok_or_else(|| RollerError::ProfileNotFound {
            key: key.to_string(),
        })
    }

    /// Get a profile together with its origin
    pub fn entry(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    /// All entries, sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(k, e)| (k.as_str(), e)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Account mismatches found while merging, in the order they occurred
    pub fn conflicts(&self) -> &[MergeConflict] {
        &self.conflicts
    }
}
