//! CsvLoader - Load profiles from a delimited file

use crate::Loader;
use shared::{expand_home, RawProfile, Result, RollerError, SourceDescriptor};
use std::io::Read;
use std::path::PathBuf;
use url::Url;

/// What a CSV column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    AccountName,
    AccountId,
    Role,
    Ttl,
    /// AWS console switch-role link carrying `account` and `roleName`
    SwitchUrl,
    /// Unknown mapping token, the column is skipped
    Ignored,
}

impl Column {
    pub fn parse(token: &str) -> Self {
        match token {
            "account_name" => Column::AccountName,
            "account_id" => Column::AccountId,
            "role" => Column::Role,
            "ttl" => Column::Ttl,
            "switch_url" => Column::SwitchUrl,
            _ => Column::Ignored,
        }
    }
}

/// Base for switch-role links given as a bare query or path
const SWITCH_ROLE_BASE: &str = "https://signin.aws.amazon.com/switchrole";

/// Column layout used when a source has no `mapping` option
pub const DEFAULT_MAPPING: [Column; 4] = [
    Column::AccountName,
    Column::AccountId,
    Column::Role,
    Column::Ttl,
];

/// Built-in loader reading one profile per CSV row
///
/// Options:
/// - `path` (required): file to read, `~/` and relative paths are resolved
/// - `skip_first`: treat the first row as a header
/// - `mapping`: column layout, see [`Column`]
///
/// Any malformed row fails the whole source. A bad mapping would corrupt
/// every row the same way, so there is nothing worth salvaging.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvLoader;

impl CsvLoader {
    /// Name the loader is registered under
    pub const NAME: &'static str = "csv";

    pub fn new() -> Self {
        Self
    }

    /// Parse CSV content with an explicit layout
    pub fn parse<R: Read>(
        source_name: &str,
        input: R,
        skip_first: bool,
        mapping: &[Column],
    ) -> Result<Vec<RawProfile>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(skip_first)
            .from_reader(input);

        let mut profiles = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| RollerError::load(source_name, e.to_string()))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let profile = parse_row(&record, mapping)
                .map_err(|e| RollerError::load(source_name, format!("line {}: {}", line, e)))?;
            profiles.push(profile);
        }

        Ok(profiles)
    }

    fn resolve_path(raw: &str) -> Result<PathBuf> {
        let path = expand_home(raw);
        if path.is_relative() {
            Ok(std::env::current_dir()?.join(path))
        } else {
            Ok(path)
        }
    }
}

impl Loader for CsvLoader {
    fn load(&self, source: &SourceDescriptor) -> Result<Vec<RawProfile>> {
        let path = Self::resolve_path(source.require_str("path")?)?;
        let skip_first = source.option_bool("skip_first")?.unwrap_or(false);
        let mapping = match source.option_str_list("mapping")? {
            Some(tokens) => tokens.iter().map(|t| Column::parse(t)).collect(),
            None => DEFAULT_MAPPING.to_vec(),
        };

        let file = std::fs::File::open(&path).map_err(|e| {
            RollerError::load(source.name(), format!("can not open {}: {}", path.display(), e))
        })?;

        let profiles = Self::parse(source.name(), file, skip_first, &mapping)?;
        tracing::debug!("Read {} profiles from {}", profiles.len(), path.display());
        Ok(profiles)
    }
}

fn parse_row(record: &csv::StringRecord, mapping: &[Column]) -> std::result::Result<RawProfile, String> {
    let mut profile = RawProfile::default();

    // zip stops at the shorter side, so extra cells are ignored
    for (cell, column) in record.iter().zip(mapping) {
        let params = &mut profile.parameters;
        match column {
            Column::AccountName => profile.name = cell.trim().to_string(),
            Column::AccountId => params.account_id = cell.trim().to_string(),
            Column::Role => params.role = cell.trim().to_string(),
            Column::Ttl => params.ttl = cell.trim().to_string(),
            Column::SwitchUrl => {
                let cell = cell.trim();
                if cell.is_empty() {
                    continue;
                }
                let url = Url::parse(SWITCH_ROLE_BASE)
                    .and_then(|base| base.join(cell))
                    .map_err(|e| format!("invalid switch_url '{}': {}", cell, e))?;
                if params.role.is_empty() {
                    if let Some(role) = query_value(&url, "roleName") {
                        params.role = role;
                    }
                }
                if params.account_id.is_empty() {
                    if let Some(account) = query_value(&url, "account") {
                        params.account_id = account;
                    }
                }
            }
            Column::Ignored => {}
        }
    }

    Ok(profile)
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
