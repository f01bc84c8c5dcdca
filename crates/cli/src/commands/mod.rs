//! CLI Commands

pub mod cache;
pub mod loaders;
pub mod show;

pub use cache::CacheCommand;
pub use loaders::LoadersCommand;
pub use show::ShowCommand;
