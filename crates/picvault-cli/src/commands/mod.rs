//! CLI command definitions and dispatch.

pub mod migrate;
pub mod serve;
pub mod token;
pub mod trash;
pub mod tree;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use picvault_core::config::AppConfig;
use picvault_core::error::AppError;
use picvault_core::traits::media::MediaStore;
use picvault_database::NodeStore;
use picvault_service::NodeService;
use picvault_storage::MediaManager;

/// PicVault: per-user image library
#[derive(Debug, Parser)]
#[command(name = "picvault", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file; defaults to config/{PICVAULT_ENV}.toml layering
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the PicVault server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Development bearer tokens
    Token(token::TokenArgs),
    /// Print a user's file tree
    Tree(tree::TreeArgs),
    /// Trash maintenance
    Trash(trash::TrashArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = load_config(self.config.as_deref())?;
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Token(args) => token::execute(args, &config, self.format),
            Commands::Tree(args) => tree::execute(args, &config, self.format).await,
            Commands::Trash(args) => trash::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: load configuration from an explicit file or the environment layering
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, AppError> {
    match config_path {
        Some(path) => AppConfig::from_file(path),
        None => {
            let env = std::env::var("PICVAULT_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Helper: connect the configured backends and build a node service
pub async fn node_service(config: &AppConfig) -> Result<(NodeStore, NodeService), AppError> {
    let store = NodeStore::connect(&config.database).await?;
    let media: Arc<dyn MediaStore> = Arc::new(MediaManager::new(&config.storage).await?);
    let service = NodeService::new(store.repository(), media, config.storage.clone());
    Ok((store, service))
}
