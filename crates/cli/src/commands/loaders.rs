//! roller loaders command

use crate::Context;
use clap::Args;

#[derive(Debug, Args)]
pub struct LoadersCommand;

impl LoadersCommand {
    pub fn run(&self, ctx: &Context) -> anyhow::Result<()> {
        println!("Available loaders:");
        for name in ctx.registry.names() {
            println!("  - {}", name);
        }
        println!("Plugins are discovered in {}", ctx.config.plugin_dir.display());
        Ok(())
    }
}
