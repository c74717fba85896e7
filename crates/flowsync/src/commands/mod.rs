//! CLI command handlers.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use console::style;

use flowsync_client::ApiClient;
use flowsync_config::{ConfigStore, DomainConfig};
use flowsync_engine::{BatchOutcome, BatchReport};
use flowsync_index::IndexClient;

pub mod check;
pub mod config;
pub mod domain;
pub mod embed;
pub mod sync;
pub mod update;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Root of the component project being synchronized.
    pub project_root: PathBuf,
    /// Verbose output enabled.
    pub verbose: bool,
}

/// Load the persisted store and return the active domain's settings.
pub fn active_domain() -> Result<DomainConfig> {
    let store = ConfigStore::load().context("failed to load configuration")?;
    Ok(store.active()?.clone())
}

/// Connect the index and API clients for a domain.
pub async fn connect(domain: &DomainConfig) -> Result<(IndexClient, ApiClient)> {
    let index = IndexClient::connect(&domain.db_connection_string())
        .await
        .with_context(|| format!("cannot reach index database at {}", domain.db_host))?;
    let api = ApiClient::builder()
        .base_url(&domain.api_base_url)
        .api_version(&domain.api_version)
        .build()
        .context("invalid API configuration")?;
    Ok((index, api))
}

/// Print the end-of-run summary and resolve the process outcome.
///
/// Exits nonzero when the batch failed; "up to date" and "success" both
/// exit zero but print differently.
pub fn finish(report: &BatchReport) -> Result<()> {
    let outcome = report.outcome();

    if outcome == BatchOutcome::UpToDate {
        println!("{}", style("✓ Everything up to date").green().bold());
        return Ok(());
    }

    println!();
    println!("{}", style("─".repeat(50)).dim());
    for (label, stats) in report.stats() {
        let mut parts = Vec::new();
        if stats.created > 0 {
            parts.push(format!("{} created", stats.created));
        }
        if stats.updated > 0 {
            parts.push(format!("{} updated", stats.updated));
        }
        if stats.skipped > 0 {
            parts.push(format!("{} skipped", stats.skipped));
        }
        if stats.failed > 0 {
            parts.push(format!("{} failed", stats.failed));
        }
        println!("  {:<12} {}", label, parts.join(", "));
    }
    let totals = report.totals();
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} file(s): {} {} {} {}",
        report.total,
        style(format!("{} created", totals.created)).green(),
        style(format!("{} updated", totals.updated)).green(),
        style(format!("{} skipped", totals.skipped)).dim(),
        if totals.failed > 0 {
            style(format!("{} failed", totals.failed)).red()
        } else {
            style("0 failed".to_string()).dim()
        },
    );

    if let Some(ok) = report.reinitialized {
        if ok {
            println!("  {}", style("engine reinitialized").dim());
        } else {
            println!(
                "  {}",
                style("⚠ engine reinitialize failed (continuing)").yellow()
            );
        }
    }

    if !report.failures.is_empty() {
        println!();
        println!("{}", style("Failures:").red().bold());
        for failure in &report.failures {
            println!(
                "  {} {} [{}] {}",
                style("✗").red(),
                failure.file.display(),
                failure.component_type,
                failure.message
            );
        }
    }
    println!();

    if outcome == BatchOutcome::Failed {
        std::process::exit(1);
    }
    Ok(())
}
