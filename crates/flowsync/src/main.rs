//! flowsync - keep workflow component definitions in sync with the engine.
//!
//! Main entry point for the flowsync CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{check, config, domain, embed, sync, update};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// flowsync - workflow component synchronization
#[derive(Parser)]
#[command(name = "flowsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (default: current directory)
    #[arg(long, global = true, env = "FLOWSYNC_PROJECT_ROOT")]
    pub project_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace changed definitions: delete stale instances, then republish
    Update(update::UpdateArgs),

    /// Publish definitions missing from the index; never deletes
    Sync(sync::SyncArgs),

    /// Embed script files into their referencing definitions
    Embed(embed::EmbedArgs),

    /// Check manifest, API, and database connectivity
    Check(check::CheckArgs),

    /// Manage named connection domains
    Domain(domain::DomainArgs),

    /// Show or change the active domain's settings
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing — console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "flowsync=debug,flowsync_engine=debug,flowsync_index=debug,flowsync_client=debug,flowsync_config=debug,info"
    } else {
        "flowsync=info,flowsync_engine=warn,flowsync_index=warn,flowsync_client=warn,warn"
    };

    let log_dir = flowsync_config::config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "flowsync.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "flowsync=trace,flowsync_engine=trace,flowsync_index=trace,flowsync_client=trace,flowsync_config=trace,info",
                )),
        )
        .init();

    let project_root = match cli.project_root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let ctx = commands::Context {
        project_root,
        verbose: cli.verbose,
    };
    tracing::debug!(project_root = %ctx.project_root.display(), "starting");

    // Dispatch to command handlers
    match cli.command {
        Commands::Update(args) => update::run(args, &ctx).await,
        Commands::Sync(args) => sync::run(args, &ctx).await,
        Commands::Embed(args) => embed::run(args, &ctx).await,
        Commands::Check(args) => check::run(args, &ctx).await,
        Commands::Domain(args) => domain::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
