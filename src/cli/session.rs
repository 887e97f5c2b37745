//! Namespace and token CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;
use owo_colors::OwoColorize;

use crate::startup::Explorer;

#[derive(Subcommand)]
pub enum NamespaceCommands {
    /// Show the active namespace
    Show,

    /// Switch namespace; the cached token is dropped
    #[command(after_help = "EXAMPLES:\n    vaultdeck namespace set team-a\n    vaultdeck namespace set team-a/child")]
    Set {
        /// Namespace name
        #[arg(value_name = "NAMESPACE")]
        namespace: String,
    },

    /// Return to the root namespace
    Clear,
}

pub async fn handle_namespace_command(command: NamespaceCommands, explorer: &Explorer) -> Result<()> {
    let credentials = explorer.credentials();
    match command {
        NamespaceCommands::Show => match credentials.namespace()? {
            Some(namespace) => println!("{}", namespace),
            None => println!("(root)"),
        },
        NamespaceCommands::Set { namespace } => {
            credentials.set_namespace(Some(&namespace)).await.context("Failed to store namespace")?;
            match credentials.namespace()? {
                Some(active) => println!("{}", format!("Namespace set to '{}'", active).green()),
                None => println!("{}", "Namespace cleared".green()),
            }
        }
        NamespaceCommands::Clear => {
            credentials.set_namespace(None).await.context("Failed to clear namespace")?;
            println!("{}", "Namespace cleared".green());
        }
    }
    Ok(())
}

/// Print a valid token, logging in first when the cache has none.
pub async fn print_token(explorer: &Explorer) -> Result<()> {
    let credentials = explorer.credentials();
    let token = match credentials.cached_token()? {
        Some(cached) => cached.token,
        None => credentials.authenticated_client().await.context("Login failed")?.token().clone(),
    };
    println!("{}", token.expose_secret());
    Ok(())
}

pub async fn logout(explorer: &Explorer) -> Result<()> {
    explorer.credentials().logout().await.context("Failed to clear cached token")?;
    println!("{}", "Cached token removed".green());
    Ok(())
}
