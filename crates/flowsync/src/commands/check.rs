//! Check command - diagnose manifest, API, and database connectivity.

use anyhow::Result;
use clap::Args;
use console::style;

use flowsync_client::ApiClient;
use flowsync_config::{ComponentType, Manifest};
use flowsync_engine::DiscoveredFolders;
use flowsync_index::IndexClient;

use super::Context;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {}

/// Run the check command.
///
/// Purely diagnostic: reports each collaborator's state and never changes
/// anything. Exits nonzero when a required piece is broken.
pub async fn run(_args: CheckArgs, ctx: &Context) -> Result<()> {
    let domain = super::active_domain()?;
    let mut healthy = true;

    println!();
    println!("{}", style("Configuration").bold());

    let manifest = match Manifest::load(&ctx.project_root) {
        Ok(manifest) => {
            println!("  {} project manifest found", style("✓").green());
            println!("    domain: {}", style(&manifest.domain).dim());
            println!(
                "    components root: {}",
                style(manifest.components_root(&ctx.project_root).display()).dim()
            );
            Some(manifest)
        }
        Err(e) => {
            println!("  {} {}", style("✗").red(), e);
            healthy = false;
            None
        }
    };

    println!();
    println!("{}", style("Connections").bold());

    let api = ApiClient::builder()
        .base_url(&domain.api_base_url)
        .api_version(&domain.api_version)
        .build()?;
    if api.health().await {
        println!(
            "  {} API reachable ({})",
            style("✓").green(),
            domain.api_base_url
        );
    } else {
        println!(
            "  {} API not reachable ({})",
            style("✗").red(),
            domain.api_base_url
        );
        healthy = false;
    }

    match IndexClient::connect(&domain.db_connection_string()).await {
        Ok(index) if index.test_connection().await => {
            println!(
                "  {} database connected ({}:{})",
                style("✓").green(),
                domain.db_host,
                domain.db_port
            );
        }
        _ => {
            println!(
                "  {} database not reachable ({}:{})",
                style("✗").red(),
                domain.db_host,
                domain.db_port
            );
            healthy = false;
        }
    }

    if let Some(manifest) = manifest {
        println!();
        println!("{}", style("Component folders").bold());
        let folders = DiscoveredFolders::discover(&ctx.project_root, &manifest);
        for ty in ComponentType::ALL {
            if manifest.folder_name(ty).is_none() {
                continue;
            }
            match folders.get(ty) {
                Some(path) => {
                    println!(
                        "  {} {:<12} → {}",
                        style("✓").green(),
                        ty.label(),
                        style(path.display()).dim()
                    );
                }
                None => {
                    println!(
                        "  {} {:<12} {}",
                        style("○").yellow(),
                        ty.label(),
                        style("(not found)").dim()
                    );
                }
            }
        }
        if folders.is_empty() {
            healthy = false;
        }
    }

    println!();
    if !healthy {
        std::process::exit(1);
    }
    println!("{}", style("✓ Check passed").green().bold());
    Ok(())
}
