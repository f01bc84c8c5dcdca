//! # Roller CLI
//!
//! Commands over the profile catalog. Role switching itself lives outside
//! this crate and only consumes the catalog by key.

pub mod commands;
mod context;

pub use context::Context;
