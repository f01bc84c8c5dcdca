//! Runtime context shared by all commands

use anyhow::Context as _;
use cache::DiskCache;
use catalog::{Aggregator, Catalog};
use loaders::LoaderRegistry;
use shared::RollerConfig;
use std::path::Path;

/// Configuration plus the registry and cache built from it
#[derive(Debug)]
pub struct Context {
    pub config: RollerConfig,
    pub registry: LoaderRegistry,
    pub cache: DiskCache,
    /// Shell output mode, merge conflicts are not reported
    pub shell: bool,
}

impl Context {
    /// Load the config file (default location when `None`) and discover plugins
    pub fn load(config_path: Option<&Path>, shell: bool) -> anyhow::Result<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(RollerConfig::default_path);
        let config = RollerConfig::from_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;

        Self::from_config(config, shell)
    }

    pub fn from_config(config: RollerConfig, shell: bool) -> anyhow::Result<Self> {
        let mut registry = LoaderRegistry::with_builtins();
        registry
            .discover(&config.plugin_dir)
            .with_context(|| format!("Failed to scan plugin dir {}", config.plugin_dir.display()))?;

        let cache = DiskCache::new(&config.cache_dir);

        Ok(Self {
            config,
            registry,
            cache,
            shell,
        })
    }

    /// Build the catalog from every configured source
    pub fn build_catalog(&self) -> anyhow::Result<Catalog> {
        let catalog = Aggregator::new(&self.registry, &self.cache)
            .quiet(self.shell)
            .default_profile(self.config.profile.clone())
            .build(&self.config.sources)?;
        Ok(catalog)
    }
}
