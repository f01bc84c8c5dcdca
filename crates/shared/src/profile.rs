//! Profile types produced by loaders

use serde::{Deserialize, Serialize};

/// Parameters needed to switch into a role
///
/// Serialized with the field names used by the on-disk cache files. Older
/// caches spell the account field `AccountId`, which is accepted on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleParameters {
    /// Profile to switch from (empty = use the configured default)
    #[serde(rename = "FromProfile", default)]
    pub from_profile: String,

    /// Target account identifier
    #[serde(rename = "AccountID", alias = "AccountId", default)]
    pub account_id: String,

    /// Role name within the target account
    #[serde(rename = "Role", default)]
    pub role: String,

    /// Requested session lifetime, as written by the source
    #[serde(rename = "TTL", default)]
    pub ttl: String,
}

impl RoleParameters {
    /// Create parameters for an account and role
    pub fn new(account_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            role: role.into(),
            ..Default::default()
        }
    }
}

/// A single role record as produced by a loader
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProfile {
    /// Human-readable account name
    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "Parameters", default)]
    pub parameters: RoleParameters,
}

impl RawProfile {
    pub fn new(name: impl Into<String>, parameters: RoleParameters) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Builder: set the source profile
    pub fn with_from_profile(mut self, from_profile: impl Into<String>) -> Self {
        self.parameters.from_profile = from_profile.into();
        self
    }

    /// Builder: set the session ttl
    pub fn with_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.parameters.ttl = ttl.into();
        self
    }
}
