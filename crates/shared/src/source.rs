//! Source descriptors

use crate::ConfigError;
use serde::Serialize;
use serde_json::Value;

/// Free-form per-source options, validated by the loader that reads them
pub type SourceOptions = serde_json::Map<String, Value>;

/// Whether a source name is usable as a cache file stem
///
/// Names become `<cache_dir>/<name>.json`, so path separators and `..` are
/// rejected to keep every file inside the cache directory.
pub fn is_valid_source_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}

/// Immutable description of one configured source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceDescriptor {
    name: String,
    loader: String,
    options: SourceOptions,
    ttl: i64,
}

impl SourceDescriptor {
    pub fn new(
        name: impl Into<String>,
        loader: impl Into<String>,
        options: SourceOptions,
        ttl: i64,
    ) -> Self {
        Self {
            name: name.into(),
            loader: loader.into(),
            options,
            ttl,
        }
    }

    /// Source name, also the cache file stem
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the loader that produces this source's profiles
    pub fn loader(&self) -> &str {
        &self.loader
    }

    pub fn options(&self) -> &SourceOptions {
        &self.options
    }

    /// Cache lifetime in seconds
    pub fn ttl(&self) -> i64 {
        self.ttl
    }

    /// Whether loaded output should be persisted at all
    pub fn is_cached(&self) -> bool {
        self.ttl > 0
    }

    /// Get a string option, failing if it is present with another type
    pub fn option_str(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        match self.options.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.mistyped(key, "a string", other)),
        }
    }

    /// Get a string option that must be present
    pub fn require_str(&self, key: &str) -> Result<&str, ConfigError> {
        self.option_str(key)?.ok_or_else(|| {
            ConfigError::new(&self.name, format!("options.{}", key), "option is required")
        })
    }

    /// Get a boolean option, failing if it is present with another type
    pub fn option_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.options.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.mistyped(key, "a boolean", other)),
        }
    }

    /// Get a list-of-strings option, failing on any non-string element
    pub fn option_str_list(&self, key: &str) -> Result<Option<Vec<String>>, ConfigError> {
        match self.options.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(self.mistyped(key, "a list of strings", other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(self.mistyped(key, "a list of strings", other)),
        }
    }

    fn mistyped(&self, key: &str, expected: &str, found: &Value) -> ConfigError {
        ConfigError::new(
            &self.name,
            format!("options.{}", key),
            format!("expected {}, found {}", expected, found),
        )
    }
}
