//! Merge - Folds source results into a catalog, first source wins

use crate::catalog::{catalog_key, Catalog, CatalogEntry, MergeConflict};
use shared::RawProfile;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Accumulator for folding sources, in configuration order, into a [`Catalog`]
#[derive(Debug, Default)]
pub struct Merge {
    entries: HashMap<String, CatalogEntry>,
    conflicts: Vec<MergeConflict>,
    quiet: bool,
}

impl Merge {
    /// Start an empty merge; a quiet merge never reports conflicts
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            ..Default::default()
        }
    }

    /// Merge one source's profiles, in order
    ///
    /// A key already present keeps its value. When the accounts differ the
    /// conflict is logged and recorded, unless the merge is quiet.
    pub fn merge(mut self, source_name: &str, profiles: impl IntoIterator<Item = RawProfile>) -> Self {
        for profile in profiles {
            match self.entries.entry(catalog_key(&profile)) {
                Entry::Vacant(slot) => {
                    slot.insert(CatalogEntry {
                        profile,
                        source_name: source_name.to_string(),
                    });
                }
                Entry::Occupied(slot) => {
                    let current = slot.get();
                    if self.quiet || current.profile.parameters.account_id == profile.parameters.account_id {
                        continue;
                    }

                    tracing::warn!(
                        "There is an account ID mismatch between 2 loaders for {}. Already had {} from '{}', ignoring {} from '{}'.",
                        slot.key(),
                        current.profile.parameters.account_id,
                        current.source_name,
                        profile.parameters.account_id,
                        source_name,
                    );
                    self.conflicts.push(MergeConflict {
                        key: slot.key().clone(),
                        kept_account: current.profile.parameters.account_id.clone(),
                        kept_source: current.source_name.clone(),
                        ignored_account: profile.parameters.account_id,
                        ignored_source: source_name.to_string(),
                    });
                }
            }
        }
        self
    }

    /// Freeze into a catalog, filling `default_profile` into profiles that name none
    pub fn finish(mut self, default_profile: Option<&str>) -> Catalog {
        if let Some(default_profile) = default_profile {
            for entry in self.entries.values_mut() {
                if entry.profile.parameters.from_profile.is_empty() {
                    entry.profile.parameters.from_profile = default_profile.to_string();
                }
            }
        }
        Catalog::new(self.entries, self.conflicts)
    }
}
