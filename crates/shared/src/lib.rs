//! # Roller Shared
//!
//! Profile, source and configuration types used across all Roller crates.

pub mod config;
pub mod error;
pub mod profile;
pub mod source;

// Re-exports
pub use config::*;
pub use error::*;
pub use profile::*;
pub use source::*;
