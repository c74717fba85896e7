//! Config command - show or change the active domain's settings.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;

use flowsync_config::{ConfigStore, store_path};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the active domain's settings
    Show,

    /// Set a value on the active domain (e.g. api_base_url, db_host)
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },

    /// Show the configuration file path
    Path,

    /// Reset configuration to defaults (removes all extra domains)
    Reset,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, _ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let store = ConfigStore::load()?;
            let domain = store.active()?;
            println!("active domain: {}", style(&domain.name).bold());
            println!("  api_base_url = {}", domain.api_base_url);
            println!("  api_version  = {}", domain.api_version);
            println!("  db_host      = {}", domain.db_host);
            println!("  db_port      = {}", domain.db_port);
            println!("  db_name      = {}", domain.db_name);
            println!("  db_user      = {}", domain.db_user);
            println!("  db_password  = {}", "*".repeat(domain.db_password.len()));
        }
        ConfigCommand::Set { key, value } => {
            let mut store = ConfigStore::load()?;
            store.set_value(&key, &value)?;
            store.save()?;
            println!("{} {} updated", style("✓").green(), key);
        }
        ConfigCommand::Path => match store_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("(no config directory available)"),
        },
        ConfigCommand::Reset => {
            let mut store = ConfigStore::load()?;
            store.reset();
            store.save()?;
            println!("{} configuration reset to defaults", style("✓").green());
        }
    }
    Ok(())
}
