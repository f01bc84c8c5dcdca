//! # Roller Cache
//!
//! Disk cache memoizing each source's loaded profiles until its TTL expires.

mod disk_cache;

pub use disk_cache::{CacheEntry, CacheState, CacheStatus, CacheWriteError, DiskCache};
