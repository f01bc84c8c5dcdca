//! # Roller Catalog
//!
//! Builds the profile catalog: asks the cache for each configured source,
//! loads the ones that missed, and merges everything in configuration order.

mod aggregator;
mod catalog;
mod merge;

pub use aggregator::Aggregator;
pub use catalog::{catalog_key, sanitize, Catalog, CatalogEntry, MergeConflict};
pub use merge::Merge;

// Re-export dependencies
pub use cache::DiskCache;
pub use loaders::{Loader, LoaderRegistry};
