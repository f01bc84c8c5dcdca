//! Roller CLI - Command-line interface for Roller
//!
//! Usage:
//!   roller cache              - List every role key in the catalog
//!   roller cache clear        - Delete all cached sources
//!   roller cache status       - Show cache freshness per source
//!   roller show <key>         - Show the profile behind a key
//!   roller loaders            - List available loaders

use clap::{Parser, Subcommand};
use cli::commands::{CacheCommand, LoadersCommand, ShowCommand};
use cli::Context;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roller")]
#[command(about = "Roller - Aggregated AWS role catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use
    #[arg(short, long, global = true, env = "ROLLER_CONFIG")]
    config: Option<PathBuf>,

    /// Avoid printing warnings (for shell integration)
    #[arg(long, global = true, env = "ROLLER_SHELL")]
    shell: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the account cache
    Cache(CacheCommand),
    /// Show a single role
    Show(ShowCommand),
    /// List available loaders
    Loaders(LoadersCommand),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::load(cli.config.as_deref(), cli.shell)?;

    match cli.command {
        Commands::Cache(cmd) => cmd.run(&ctx),
        Commands::Show(cmd) => cmd.run(&ctx),
        Commands::Loaders(cmd) => cmd.run(&ctx),
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
