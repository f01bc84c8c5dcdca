//! Error types for Roller

use thiserror::Error;

/// Error thrown when a configured source is malformed
#[derive(Debug, Error)]
#[error("Invalid value for '{field}' in source '{source_name}': {reason}")]
pub struct ConfigError {
    pub source_name: String,
    pub field: String,
    pub reason: String,
}

impl ConfigError {
    pub fn new(
        source_name: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error thrown when a source names a loader nobody registered
#[derive(Debug, Error)]
#[error("Unknown loader '{loader}' for source '{source_name}'. Available loaders: {}", available_loaders.join(", "))]
pub struct UnknownLoaderError {
    pub loader: String,
    pub source_name: String,
    pub available_loaders: Vec<String>,
}

/// General Roller error type
#[derive(Debug, Error)]
pub enum RollerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    UnknownLoader(#[from] UnknownLoaderError),

    #[error("{loader} is either outdated or invalid (source '{source_name}'): {reason}. Make sure it implements the loader interface")]
    InvalidLoader {
        loader: String,
        source_name: String,
        reason: String,
    },

    #[error("Failed to load source '{source_name}': {message}")]
    Load {
        source_name: String,
        message: String,
    },

    #[error("The given role can not be loaded from the cache: {key}")]
    ProfileNotFound { key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RollerError {
    /// Build a source-load error
    pub fn load(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RollerError>;
