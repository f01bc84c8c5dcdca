//! Loader - The contract every profile source implements

use shared::{RawProfile, Result, SourceDescriptor};

/// Produces the raw profiles of one configured source
///
/// Implementations read whatever options they understand from the
/// descriptor and fail with a [`shared::ConfigError`] when one of them is
/// missing or mistyped. The aggregator and the disk cache never look at which
/// loader produced a list of profiles.
pub trait Loader: Send + Sync {
    /// Load every profile the source currently provides
    fn load(&self, source: &SourceDescriptor) -> Result<Vec<RawProfile>>;

    /// Whether a profile should be included in the catalog
    ///
    /// Applied to cached and freshly loaded profiles alike.
    fn is_valid(&self, _profile: &RawProfile) -> bool {
        true
    }
}
