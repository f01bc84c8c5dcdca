//! Aggregator - Builds the catalog from every configured source

use crate::{Catalog, Merge};
use cache::DiskCache;
use chrono::{DateTime, Utc};
use loaders::{Loader, LoaderRegistry};
use shared::{RawProfile, Result, RollerError, SourceDescriptor};

/// Drives the cache-or-load decision for each source and merges the results
#[derive(Debug)]
pub struct Aggregator<'a> {
    registry: &'a LoaderRegistry,
    cache: &'a DiskCache,
    quiet: bool,
    default_profile: Option<String>,
}

impl<'a> Aggregator<'a> {
    pub fn new(registry: &'a LoaderRegistry, cache: &'a DiskCache) -> Self {
        Self {
            registry,
            cache,
            quiet: false,
            default_profile: None,
        }
    }

    /// Builder: suppress merge conflict warnings (shell output mode)
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Builder: profile to switch from when a source names none
    pub fn default_profile(mut self, profile: Option<String>) -> Self {
        self.default_profile = profile;
        self
    }

    /// Build the catalog as of now
    pub fn build(&self, sources: &[SourceDescriptor]) -> Result<Catalog> {
        self.build_at(sources, Utc::now())
    }

    /// Build the catalog as of `now`
    ///
    /// Every loader is resolved before anything is loaded, so a typo in the
    /// configuration fails the run up front. Sources are then processed and
    /// merged strictly in the given order.
    pub fn build_at(&self, sources: &[SourceDescriptor], now: DateTime<Utc>) -> Result<Catalog> {
        let resolved = sources
            .iter()
            .map(|source| -> Result<_> { Ok((source, self.registry.resolve(source)?)) })
            .collect::<Result<Vec<_>>>()?;

        let merged = resolved
            .into_iter()
            .try_fold(Merge::new(self.quiet), |merge, (source, loader)| {
                let profiles = self.fetch(source, loader.as_ref(), now)?;
                let valid = profiles.into_iter().filter(|p| loader.is_valid(p));
                Ok::<_, RollerError>(merge.merge(source.name(), valid))
            })?;

        let catalog = merged.finish(self.default_profile.as_deref());
        tracing::debug!("Catalog built with {} profiles from {} sources", catalog.len(), sources.len());
        Ok(catalog)
    }

    fn fetch(&self, source: &SourceDescriptor, loader: &dyn Loader, now: DateTime<Utc>) -> Result<Vec<RawProfile>> {
        if source.is_cached() {
            if let Some(profiles) = self.cache.get(source.name(), now) {
                return Ok(profiles);
            }
        }

        tracing::debug!("Loading '{}' with loader '{}'", source.name(), source.loader());
        let profiles = loader.load(source)?;

        if let Err(e) = self.cache.put(source.name(), source.ttl(), &profiles, now) {
            tracing::warn!("Could not cache '{}', continuing without it: {}", source.name(), e);
        }

        Ok(profiles)
    }
}
