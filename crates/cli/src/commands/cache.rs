//! roller cache command

use crate::Context;
use cache::{CacheState, CacheStatus};
use clap::{Args, Subcommand};
use console::style;

#[derive(Debug, Args)]
pub struct CacheCommand {
    #[command(subcommand)]
    pub command: Option<CacheSubcommand>,
}

#[derive(Debug, Subcommand)]
pub enum CacheSubcommand {
    /// Clear the account cache
    Clear,
    /// Show what is cached for each source
    Status,
}

impl CacheCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        match &self.command {
            None => {
                let catalog = ctx.build_catalog()?;
                for key in catalog.keys() {
                    println!("{}", key);
                }
            }
            Some(CacheSubcommand::Clear) => {
                ctx.cache.clear()?;
                tracing::debug!("Cleared {}", ctx.cache.dir().display());
            }
            Some(CacheSubcommand::Status) => {
                let statuses = ctx.cache.status(chrono::Utc::now());
                if statuses.is_empty() {
                    println!("Nothing cached in {}", ctx.cache.dir().display());
                }
                for status in &statuses {
                    println!("{}", format_status(status));
                }
            }
        }
        Ok(())
    }
}

fn format_status(status: &CacheStatus) -> String {
    let state = match &status.state {
        CacheState::Fresh => style("fresh".to_string()).green(),
        CacheState::Expired => style("expired".to_string()).yellow(),
        CacheState::Corrupt(reason) => style(format!("corrupt ({})", reason)).red(),
    };

    match status.valid_until {
        Some(valid_until) => format!(
            "{}  {}  {} profiles, valid until {}",
            status.source_name,
            state,
            status.profile_count,
            valid_until.to_rfc3339()
        ),
        None => format!("{}  {}", status.source_name, state),
    }
}
