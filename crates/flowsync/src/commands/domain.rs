//! Domain command - manage named connection domains.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;

use flowsync_config::ConfigStore;

use super::Context;

/// Arguments for the domain command.
#[derive(Args, Debug)]
pub struct DomainArgs {
    #[command(subcommand)]
    pub command: DomainCommand,
}

#[derive(Subcommand, Debug)]
pub enum DomainCommand {
    /// List all domains, marking the active one
    List,

    /// Add a new domain (inherits settings from the default domain)
    Add {
        /// Domain name
        name: String,
    },

    /// Switch the active domain
    Use {
        /// Domain name to activate
        name: String,
    },

    /// Remove a domain (the default domain cannot be removed)
    Remove {
        /// Domain name to remove
        name: String,
    },
}

/// Run the domain command.
pub async fn run(args: DomainArgs, _ctx: &Context) -> Result<()> {
    let mut store = ConfigStore::load()?;

    match args.command {
        DomainCommand::List => {
            for domain in &store.domains {
                let marker = if domain.name == store.active_domain {
                    style("●").green()
                } else {
                    style("○").dim()
                };
                println!(
                    "  {} {:<16} api={} db={}:{}/{}",
                    marker,
                    domain.name,
                    domain.api_base_url,
                    domain.db_host,
                    domain.db_port,
                    domain.db_name
                );
            }
            return Ok(());
        }
        DomainCommand::Add { name } => {
            store.add_domain(&name)?;
            println!("{} domain '{}' added", style("✓").green(), name);
        }
        DomainCommand::Use { name } => {
            store.use_domain(&name)?;
            println!("{} active domain is now '{}'", style("✓").green(), name);
        }
        DomainCommand::Remove { name } => {
            store.remove_domain(&name)?;
            println!("{} domain '{}' removed", style("✓").green(), name);
        }
    }

    store.save()?;
    Ok(())
}
