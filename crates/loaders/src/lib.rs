//! # Roller Loaders
//!
//! Profile sources for Roller.
//!
//! ## Components
//!
//! - `Loader` - The capability every source implements
//! - `LoaderRegistry` - Name lookup for built-in and discovered loaders
//! - `CsvLoader` - Built-in delimited file reader
//! - `ExternalLoader` - Out-of-process loader programs

mod csv_loader;
mod external;
mod loader;
mod registry;

pub use csv_loader::{Column, CsvLoader, DEFAULT_MAPPING};
pub use external::ExternalLoader;
pub use loader::Loader;
pub use registry::LoaderRegistry;
