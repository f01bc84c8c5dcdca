//! DiskCache - One JSON file of loaded profiles per source

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use shared::{is_valid_source_name, RawProfile};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A cached source as stored on disk
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CacheEntry {
    #[serde(rename = "ValidUntil")]
    pub valid_until: DateTime<Utc>,

    #[serde(rename = "Data", default, deserialize_with = "null_as_empty")]
    pub data: Vec<RawProfile>,
}

impl CacheEntry {
    /// An entry is usable only while its expiry is strictly in the future
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.valid_until > now
    }
}

#[derive(Serialize)]
struct CacheEntryRef<'a> {
    #[serde(rename = "ValidUntil")]
    valid_until: DateTime<Utc>,
    #[serde(rename = "Data")]
    data: &'a [RawProfile],
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RawProfile>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RawProfile>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Error returned when a source could not be persisted
#[derive(Debug, Error)]
pub enum CacheWriteError {
    #[error("'{source_name}' can not be used as a cache file name")]
    InvalidName { source_name: String },

    #[error("could not serialise '{source_name}': {error}")]
    Serialize {
        source_name: String,
        #[source]
        error: serde_json::Error,
    },

    #[error("could not write {}: {error}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

/// Freshness of one cache file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    Fresh,
    Expired,
    Corrupt(String),
}

/// Summary of one cache file, for listings
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatus {
    pub source_name: String,
    pub valid_until: Option<DateTime<Utc>>,
    pub profile_count: usize,
    pub state: CacheState,
}

enum ReadError {
    Missing,
    Unreadable(std::io::Error),
    Corrupt(serde_json::Error),
}

/// Disk-backed cache of loaded profiles
///
/// Every source owns exactly one file, `<dir>/<source>.json`, so sources
/// never contend with each other. Read problems degrade to a miss and write
/// problems are returned for the caller to report; neither aborts a run.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Create a cache rooted at `dir` (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the file path for a source's cache
    pub fn entry_path(&self, source_name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", source_name))
    }

    /// Get a source's cached profiles, or `None` on a miss
    pub fn get(&self, source_name: &str, now: DateTime<Utc>) -> Option<Vec<RawProfile>> {
        if !is_valid_source_name(source_name) {
            return None;
        }
        let entry = match self.read_entry(&self.entry_path(source_name)) {
            Ok(entry) => entry,
            Err(ReadError::Missing) => {
                tracing::debug!("No cache for '{}'", source_name);
                return None;
            }
            Err(ReadError::Unreadable(e)) => {
                tracing::warn!("Can not read the cache for '{}', ignoring it: {}", source_name, e);
                return None;
            }
            Err(ReadError::Corrupt(e)) => {
                tracing::warn!("Can not parse the cache for '{}', ignoring it: {}", source_name, e);
                return None;
            }
        };

        if entry.is_fresh(now) {
            tracing::debug!("Cache hit for '{}' ({} profiles)", source_name, entry.data.len());
            Some(entry.data)
        } else {
            tracing::debug!("Cache for '{}' expired at {}", source_name, entry.valid_until);
            None
        }
    }

    /// Persist a source's profiles for `ttl` seconds; a no-op when `ttl <= 0`
    pub fn put(
        &self,
        source_name: &str,
        ttl: i64,
        data: &[RawProfile],
        now: DateTime<Utc>,
    ) -> Result<(), CacheWriteError> {
        if ttl <= 0 {
            return Ok(());
        }
        if !is_valid_source_name(source_name) {
            return Err(CacheWriteError::InvalidName {
                source_name: source_name.to_string(),
            });
        }

        let valid_until = Duration::try_seconds(ttl)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let serialised = serde_json::to_vec(&CacheEntryRef { valid_until, data }).map_err(|error| {
            CacheWriteError::Serialize {
                source_name: source_name.to_string(),
                error,
            }
        })?;

        self.create_dir().map_err(|error| CacheWriteError::Io {
            path: self.dir.clone(),
            error,
        })?;

        let path = self.entry_path(source_name);
        self.write_atomic(&path, &serialised)
            .map_err(|error| CacheWriteError::Io { path, error })?;

        tracing::debug!("Cached {} profiles for '{}' until {}", data.len(), source_name, valid_until);
        Ok(())
    }

    /// Delete the whole cache directory; succeeds if it does not exist
    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_dir_all(&self.dir) {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }

    /// Describe every cache file, sorted by source name
    pub fn status(&self, now: DateTime<Utc>) -> Vec<CacheStatus> {
        let Some(dir) = self.dir.to_str() else {
            return Vec::new();
        };
        let pattern = format!("{}/*.json", glob::Pattern::escape(dir));
        let Ok(paths) = glob::glob(&pattern) else {
            return Vec::new();
        };

        let mut statuses: Vec<CacheStatus> = paths
            .filter_map(|path| path.ok())
            .filter_map(|path| {
                let source_name = path.file_stem()?.to_str()?.to_string();
                Some(match self.read_entry(&path) {
                    Ok(entry) => CacheStatus {
                        source_name,
                        valid_until: Some(entry.valid_until),
                        profile_count: entry.data.len(),
                        state: if entry.is_fresh(now) {
                            CacheState::Fresh
                        } else {
                            CacheState::Expired
                        },
                    },
                    Err(ReadError::Missing) => return None,
                    Err(ReadError::Unreadable(e)) => corrupt(source_name, e.to_string()),
                    Err(ReadError::Corrupt(e)) => corrupt(source_name, e.to_string()),
                })
            })
            .collect();

        statuses.sort_by(|a, b| a.source_name.cmp(&b.source_name));
        statuses
    }

    fn read_entry(&self, path: &Path) -> Result<CacheEntry, ReadError> {
        let content = std::fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReadError::Missing,
            _ => ReadError::Unreadable(e),
        })?;
        serde_json::from_slice(&content).map_err(ReadError::Corrupt)
    }

    fn create_dir(&self) -> std::io::Result<()> {
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(&self.dir)
    }

    /// Write to a temporary sibling, then rename over the target
    fn write_atomic(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        let temp_path = path.with_extension("json.tmp");

        let result = (|| {
            let mut options = std::fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }

            let mut file = options.open(&temp_path)?;
            file.write_all(data)?;
            file.sync_all()?;
            std::fs::rename(&temp_path, path)
        })();

        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        result
    }
}

fn corrupt(source_name: String, reason: String) -> CacheStatus {
    CacheStatus {
        source_name,
        valid_until: None,
        profile_count: 0,
        state: CacheState::Corrupt(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::RoleParameters;

    fn profiles() -> Vec<RawProfile> {
        vec![
            RawProfile::new("Prod", RoleParameters::new("111", "admin")),
            RawProfile::new("Dev", RoleParameters::new("222", "ro")).with_ttl("900"),
        ]
    }

    fn now() -> DateTime<Utc> {
        "2024-05-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path().join("cache"));

        cache.put("team", 60, &profiles(), now()).unwrap();

        assert_eq!(cache.get("team", now()), Some(profiles()));
        assert_eq!(cache.get("team", now() + Duration::seconds(59)), Some(profiles()));
    }

    #[test]
    fn test_expiry_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());

        cache.put("team", 60, &profiles(), now()).unwrap();

        assert_eq!(cache.get("team", now() + Duration::seconds(60)), None);
        assert_eq!(cache.get("team", now() + Duration::seconds(61)), None);
    }

    #[test]
    fn test_path_like_names_stay_inside_the_cache_dir() {
        let root = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(root.path().join("cache"));

        let err = cache.put("../escape", 60, &profiles(), now()).unwrap_err();
        assert!(matches!(err, CacheWriteError::InvalidName { ref source_name } if source_name == "../escape"));
        assert!(cache.put("nested/team", 60, &profiles(), now()).is_err());

        assert!(!root.path().join("escape.json").exists());
        assert!(!cache.dir().exists());
        assert_eq!(cache.get("../escape", now()), None);
    }

    #[test]
    fn test_non_positive_ttl_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path().join("cache"));

        cache.put("zero", 0, &profiles(), now()).unwrap();
        cache.put("negative", -1, &profiles(), now()).unwrap();

        assert!(!cache.entry_path("zero").exists());
        assert!(!cache.entry_path("negative").exists());
        assert!(!cache.dir().exists());
    }

    #[test]
    fn test_missing_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        assert_eq!(cache.get("absent", now()), None);
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        std::fs::write(cache.entry_path("team"), "{not json").unwrap();

        assert_eq!(cache.get("team", now()), None);
    }

    #[test]
    fn test_reads_entries_written_by_older_versions() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        std::fs::write(
            cache.entry_path("legacy"),
            r#"{"ValidUntil":"2024-05-01T13:00:00.123456+02:00","Data":[{"Name":"Old","Parameters":{"FromProfile":"","AccountId":"999","Role":"ops"}}]}"#,
        )
        .unwrap();
        std::fs::write(
            cache.entry_path("empty"),
            r#"{"ValidUntil":"2030-01-01T00:00:00Z","Data":null}"#,
        )
        .unwrap();

        let legacy = cache.get("legacy", "2024-05-01T10:59:59Z".parse().unwrap()).unwrap();
        assert_eq!(legacy[0].parameters.account_id, "999");
        assert_eq!(cache.get("legacy", "2024-05-01T11:00:01Z".parse().unwrap()), None);

        assert_eq!(cache.get("empty", now()), Some(Vec::new()));
    }

    #[test]
    fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        cache.put("team", 3600, &profiles(), now()).unwrap();

        let content = std::fs::read_to_string(cache.entry_path("team")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        let valid_until: DateTime<Utc> = value["ValidUntil"].as_str().unwrap().parse().unwrap();
        assert_eq!(valid_until, now() + Duration::hours(1));
        assert_eq!(value["Data"][0]["Name"], "Prod");
        assert_eq!(value["Data"][0]["Parameters"]["AccountID"], "111");
        assert!(!cache.entry_path("team").with_extension("json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path().join("cache"));
        cache.put("team", 60, &profiles(), now()).unwrap();

        let dir_mode = std::fs::metadata(cache.dir()).unwrap().permissions().mode();
        let file_mode = std::fs::metadata(cache.entry_path("team")).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
        assert_eq!(file_mode & 0o777, 0o600);
    }

    #[test]
    fn test_unwritable_dir_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("cache");
        std::fs::write(&blocker, "a file, not a directory").unwrap();

        let cache = DiskCache::new(&blocker);
        let err = cache.put("team", 60, &profiles(), now()).unwrap_err();
        assert!(matches!(err, CacheWriteError::Io { .. }));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path().join("cache"));

        cache.clear().unwrap();

        cache.put("team", 60, &profiles(), now()).unwrap();
        cache.clear().unwrap();
        cache.clear().unwrap();

        assert!(!cache.dir().exists());
        assert_eq!(cache.get("team", now()), None);
    }

    #[test]
    fn test_status_lists_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());

        cache.put("beta", 60, &profiles(), now()).unwrap();
        cache.put("alpha", 60, &profiles()[..1], now() - Duration::hours(1)).unwrap();
        std::fs::write(cache.entry_path("gamma"), "garbage").unwrap();

        let statuses = cache.status(now());
        let names: Vec<&str> = statuses.iter().map(|s| s.source_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);

        assert_eq!(statuses[0].state, CacheState::Expired);
        assert_eq!(statuses[0].profile_count, 1);
        assert_eq!(statuses[1].state, CacheState::Fresh);
        assert_eq!(statuses[1].profile_count, 2);
        assert!(matches!(statuses[2].state, CacheState::Corrupt(_)));
        assert_eq!(statuses[2].valid_until, None);
    }

    #[test]
    fn test_status_of_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path().join("never-created"));
        assert!(cache.status(now()).is_empty());
    }
}
