//! LoaderRegistry - Name lookup for loader implementations

use crate::{CsvLoader, ExternalLoader, Loader};
use shared::{SourceDescriptor, UnknownLoaderError};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Registry of available loaders, keyed by the name sources refer to
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: BTreeMap<String, Arc<dyn Loader>>,
}

impl LoaderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in loaders registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(CsvLoader::NAME, CsvLoader::new());
        registry
    }

    /// Register a loader, replacing any previous one with the same name
    pub fn register(&mut self, name: impl Into<String>, loader: impl Loader + 'static) {
        self.loaders.insert(name.into(), Arc::new(loader));
    }

    /// Register every executable file in `plugin_dir` as an external loader
    ///
    /// Names already registered are left alone, so a plugin can never shadow
    /// a built-in. Returns the number of loaders added.
    pub fn discover(&mut self, plugin_dir: &Path) -> std::io::Result<usize> {
        if !plugin_dir.is_dir() {
            return Ok(0);
        }

        let mut added = 0;
        for entry in std::fs::read_dir(plugin_dir)? {
            let entry = entry?;
            let path = entry.path();

            if !is_executable(&path) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            if self.loaders.contains_key(&name) {
                tracing::debug!("Plugin {} ignored, loader '{}' already registered", path.display(), name);
                continue;
            }

            tracing::debug!("Registered external loader '{}' from {}", name, path.display());
            self.loaders.insert(name, Arc::new(ExternalLoader::new(path)));
            added += 1;
        }

        Ok(added)
    }

    /// Get a loader by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Loader>> {
        self.loaders.get(name).cloned()
    }

    /// Resolve the loader a source refers to
    pub fn resolve(&self, source: &SourceDescriptor) -> Result<Arc<dyn Loader>, UnknownLoaderError> {
        self.get(source.loader()).ok_or_else(|| UnknownLoaderError {
            loader: source.loader().to_string(),
            source_name: source.name().to_string(),
            available_loaders: self.names().iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Get registered loader names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.loaders.keys().map(|s| s.as_str()).collect()
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("loaders", &self.names())
            .finish()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
