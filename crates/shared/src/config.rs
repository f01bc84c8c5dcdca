//! Configuration types for Roller

use crate::{is_valid_source_name, ConfigError, SourceDescriptor, SourceOptions};
use serde::Deserialize;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Base directory for Roller's config, cache and plugins
pub fn app_home() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".roller")
}

/// Expand a leading `~/` to the current user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if path == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    }
}

/// File layout as written by the user
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    cache_dir: Option<String>,
    plugin_dir: Option<String>,
    profile: Option<String>,
    loader: Option<Value>,
}

/// Parsed Roller configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RollerConfig {
    /// Directory holding one cache file per source
    pub cache_dir: PathBuf,

    /// Directory scanned for external loader programs
    pub plugin_dir: PathBuf,

    /// Default profile to switch from when a source leaves it empty
    pub profile: Option<String>,

    /// Configured sources, in file order
    pub sources: Vec<SourceDescriptor>,
}

impl Default for RollerConfig {
    fn default() -> Self {
        let home = app_home();
        Self {
            cache_dir: home.join("cache"),
            plugin_dir: home.join("plugins"),
            profile: None,
            sources: Vec::new(),
        }
    }
}

impl RollerConfig {
    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        app_home().join("config.yaml")
    }

    /// Load configuration from a YAML file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> crate::Result<Self> {
        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(content)?
        };

        let defaults = Self::default();
        Ok(Self {
            cache_dir: file.cache_dir.as_deref().map(expand_home).unwrap_or(defaults.cache_dir),
            plugin_dir: file.plugin_dir.as_deref().map(expand_home).unwrap_or(defaults.plugin_dir),
            profile: file.profile.filter(|p| !p.is_empty()),
            sources: parse_sources(file.loader)?,
        })
    }

}

fn parse_sources(value: Option<Value>) -> Result<Vec<SourceDescriptor>, ConfigError> {
    let mapping = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Mapping(mapping)) => mapping,
        Some(other) => {
            return Err(ConfigError::new(
                "*",
                "loader",
                format!("expected a mapping of source names, found {}", kind(&other)),
            ))
        }
    };

    // serde_yaml keeps mapping entries in document order
    mapping
        .into_iter()
        .map(|(name, entry)| parse_source(name, entry))
        .collect()
}

fn parse_source(name: Value, entry: Value) -> Result<SourceDescriptor, ConfigError> {
    let name = match name {
        Value::String(name) => name,
        other => {
            return Err(ConfigError::new(
                format!("{:?}", other),
                "name",
                "source names must be strings",
            ))
        }
    };

    if !is_valid_source_name(&name) {
        return Err(ConfigError::new(
            &name,
            "name",
            "source names must be non-empty and must not contain '/', '\\' or '..'",
        ));
    }

    let entry = match entry {
        Value::Mapping(entry) => entry,
        other => {
            return Err(ConfigError::new(
                &name,
                "loader",
                format!("expected a mapping, found {}", kind(&other)),
            ))
        }
    };

    let loader = match entry.get("loader") {
        Some(Value::String(loader)) if !loader.is_empty() => loader.clone(),
        Some(other) => {
            return Err(ConfigError::new(
                &name,
                "loader",
                format!("expected a loader name, found {}", kind(other)),
            ))
        }
        None => return Err(ConfigError::new(&name, "loader", "field is required")),
    };

    let ttl = match entry.get("ttl") {
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
            ConfigError::new(&name, "ttl", format!("expected an integer, found {}", n))
        })?,
        Some(other) => {
            return Err(ConfigError::new(
                &name,
                "ttl",
                format!("expected an integer, found {}", kind(other)),
            ))
        }
        None => return Err(ConfigError::new(&name, "ttl", "field is required")),
    };

    let options = match entry.get("options") {
        None | Some(Value::Null) => SourceOptions::new(),
        Some(options @ Value::Mapping(_)) => match serde_json::to_value(options) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => SourceOptions::new(),
            Err(e) => return Err(ConfigError::new(&name, "options", e.to_string())),
        },
        Some(other) => {
            return Err(ConfigError::new(
                &name,
                "options",
                format!("expected a mapping, found {}", kind(other)),
            ))
        }
    };

    Ok(SourceDescriptor::new(name, loader, options, ttl))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RollerError;

    const CONFIG: &str = r#"
cache_dir: /var/tmp/roller-cache
profile: root
loader:
  zeta:
    loader: csv
    ttl: 3600
    options:
      path: ~/accounts.csv
      skip_first: true
      mapping: [account_name, account_id, role]
  alpha:
    loader: org
    ttl: 0
"#;

    fn config_error(yaml: &str) -> ConfigError {
        match RollerConfig::from_yaml_str(yaml) {
            Err(RollerError::Config(err)) => err,
            other => panic!("expected a config error, got {:?}", other),
        }
    }

    #[test]
    fn test_config_parse() {
        let config = RollerConfig::from_yaml_str(CONFIG).unwrap();

        assert_eq!(config.cache_dir, PathBuf::from("/var/tmp/roller-cache"));
        assert_eq!(config.plugin_dir, app_home().join("plugins"));
        assert_eq!(config.profile.as_deref(), Some("root"));

        let zeta = &config.sources[0];
        assert_eq!(zeta.loader(), "csv");
        assert_eq!(zeta.ttl(), 3600);
        assert_eq!(zeta.option_bool("skip_first").unwrap(), Some(true));
        assert_eq!(
            zeta.option_str_list("mapping").unwrap().unwrap(),
            vec!["account_name", "account_id", "role"]
        );

        assert!(config.sources[1].options().is_empty());
    }

    #[test]
    fn test_source_order_follows_the_file() {
        let config = RollerConfig::from_yaml_str(CONFIG).unwrap();
        let names: Vec<&str> = config.sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RollerConfig::from_yaml_str("").unwrap();
        assert_eq!(config, RollerConfig::default());
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RollerConfig::from_file(&dir.path().join("absent.yaml")).unwrap();
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, CONFIG).unwrap();

        let config = RollerConfig::from_file(&path).unwrap();
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_mistyped_ttl_is_rejected() {
        let err = config_error("loader:\n  team:\n    loader: csv\n    ttl: soon\n");
        assert_eq!(err.source_name, "team");
        assert_eq!(err.field, "ttl");
    }

    #[test]
    fn test_fractional_ttl_is_rejected() {
        let err = config_error("loader:\n  team:\n    loader: csv\n    ttl: 1.5\n");
        assert_eq!(err.field, "ttl");
    }

    #[test]
    fn test_missing_loader_is_rejected() {
        let err = config_error("loader:\n  team:\n    ttl: 10\n");
        assert_eq!(err.field, "loader");
        assert!(err.reason.contains("required"));
    }

    #[test]
    fn test_path_like_source_name_is_rejected() {
        let err = config_error("loader:\n  ../escape:\n    loader: csv\n    ttl: 10\n");
        assert_eq!(err.source_name, "../escape");
        assert_eq!(err.field, "name");

        let err = config_error("loader:\n  a/b:\n    loader: csv\n    ttl: 10\n");
        assert_eq!(err.field, "name");
    }

    #[test]
    fn test_mistyped_options_are_rejected() {
        let err = config_error("loader:\n  team:\n    loader: csv\n    ttl: 10\n    options: [a, b]\n");
        assert_eq!(err.source_name, "team");
        assert_eq!(err.field, "options");
    }

    #[test]
    fn test_loader_section_must_be_a_mapping() {
        let err = config_error("loader: [csv]\n");
        assert_eq!(err.field, "loader");
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/x.csv"), home.join("x.csv"));
        }
        assert_eq!(expand_home("/abs/x.csv"), PathBuf::from("/abs/x.csv"));
        assert_eq!(expand_home("rel/x.csv"), PathBuf::from("rel/x.csv"));
    }
}
