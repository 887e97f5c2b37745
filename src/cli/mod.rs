//! # Command Line Interface
//!
//! Browse a KV v2 mount, read and edit secret versions, and manage the cached
//! login and namespace.

pub mod output;
pub mod secrets;
pub mod session;
pub mod tree;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config;
use crate::observability::{init_logging, log_config_info, LoggingOptions};
use crate::startup::Explorer;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "vaultdeck")]
#[command(about = "Browse and edit HashiCorp Vault KV v2 secrets")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (json, yaml, or table)
    #[arg(short, long, global = true, default_value = "table", value_parser = ["json", "yaml", "table"])]
    pub output: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the children of a folder
    #[command(after_help = "EXAMPLES:\n    vaultdeck tree\n    vaultdeck tree app/ --all\n    vaultdeck tree app --output json")]
    Tree {
        /// Folder path; the mount root when omitted
        #[arg(value_name = "PATH")]
        path: Option<String>,

        /// Include technical paths
        #[arg(short, long)]
        all: bool,
    },

    /// Read the current version of a secret
    Read {
        #[arg(value_name = "PATH")]
        path: String,

        /// Print only the secret data as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the version history of a secret
    Versions {
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Write a new version; it replaces all fields of the previous one
    #[command(after_help = "EXAMPLES:\n    vaultdeck write app/db --data '{\"user\":\"app\",\"password\":\"s3cret\"}'\n    vaultdeck write app/db --file db.json")]
    Write {
        #[arg(value_name = "PATH")]
        path: String,

        /// Secret data as a JSON object
        #[arg(long, value_name = "JSON", conflicts_with = "file")]
        data: Option<String>,

        /// File holding the secret data as a JSON object
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Delete or destroy a secret
    #[command(
        long_about = "Delete or destroy a secret.\n\n  delete       soft-deletes the current version; it can be un-deleted later\n  destroy      permanently erases one version (the current one by default)\n  destroy-all  permanently erases every version and the metadata"
    )]
    Delete {
        #[arg(value_name = "PATH")]
        path: String,

        #[arg(long, default_value = "delete", value_parser = ["delete", "destroy", "destroy-all"])]
        mode: String,

        /// Version to destroy; defaults to the current version
        #[arg(long, value_name = "NUMBER")]
        version: Option<u64>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Restore a soft-deleted version
    Undelete {
        #[arg(value_name = "PATH")]
        path: String,

        /// Version to restore; defaults to the current version
        #[arg(long, value_name = "NUMBER")]
        version: Option<u64>,
    },

    /// Destroy every secret under a folder
    DestroyTree {
        #[arg(value_name = "PATH")]
        path: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or change the active namespace
    Namespace {
        #[command(subcommand)]
        command: session::NamespaceCommands,
    },

    /// Print a valid Vault token, logging in if needed
    Token,

    /// Forget the cached token
    Logout,

    /// Print the Vault web UI link of a secret or folder
    Url {
        #[arg(value_name = "PATH")]
        path: Option<String>,
    },

    /// Save the current version of a secret as a JSON file
    Export {
        #[arg(value_name = "PATH")]
        path: String,

        /// Target directory; the downloads folder by default
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingOptions { verbose: cli.verbose, json: cli.log_json })?;

    let format = OutputFormat::from_str(&cli.output)?;
    let config = config::load(cli.config.as_deref())?;
    log_config_info(&config);
    let explorer = Explorer::from_config(config)?;

    match cli.command {
        Commands::Tree { path, all } => tree::list_tree(&explorer, path.as_deref(), all, format).await?,
        Commands::Read { path, json } => secrets::read_secret(&explorer, &path, json, format).await?,
        Commands::Versions { path } => secrets::show_versions(&explorer, &path, format).await?,
        Commands::Write { path, data, file } => {
            secrets::write_secret(&explorer, &path, data, file, format).await?
        }
        Commands::Delete { path, mode, version, yes } => {
            secrets::delete_secret(&explorer, &path, &mode, version, yes).await?
        }
        Commands::Undelete { path, version } => secrets::undelete_secret(&explorer, &path, version).await?,
        Commands::DestroyTree { path, yes } => tree::destroy_tree(&explorer, &path, yes, format).await?,
        Commands::Namespace { command } => session::handle_namespace_command(command, &explorer).await?,
        Commands::Token => session::print_token(&explorer).await?,
        Commands::Logout => session::logout(&explorer).await?,
        Commands::Url { path } => secrets::print_ui_url(&explorer, path.as_deref())?,
        Commands::Export { path, dir } => {
            secrets::export_secret(&explorer, &path, dir).await?;
        }
    }

    Ok(())
}
