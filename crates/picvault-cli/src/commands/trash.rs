//! Trash maintenance commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use picvault_core::config::AppConfig;
use picvault_core::error::AppError;
use picvault_service::RequestContext;

/// Arguments for trash commands
#[derive(Debug, Args)]
pub struct TrashArgs {
    /// Trash subcommand
    #[command(subcommand)]
    pub command: TrashCommand,
}

/// Trash subcommands
#[derive(Debug, Subcommand)]
pub enum TrashCommand {
    /// List a user's trashed items
    List {
        /// Owner id
        #[arg(short, long)]
        user: String,
    },
    /// Permanently delete everything in a user's trash
    Empty {
        /// Owner id
        #[arg(short, long)]
        user: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct TrashRow {
    path: String,
    kind: String,
    id: String,
}

/// Execute trash commands
pub async fn execute(args: &TrashArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let (store, service) = super::node_service(config).await?;

    match &args.command {
        TrashCommand::List { user } => {
            let ctx = RequestContext::new(user.clone());
            let rows: Vec<TrashRow> = service
                .list_trash(&ctx)
                .await?
                .into_iter()
                .map(|n| TrashRow {
                    kind: if n.is_folder { "folder" } else { "file" }.to_string(),
                    path: n.path,
                    id: n.id.to_string(),
                })
                .collect();
            output::print_rows(&rows, format, "Trash is empty.");
        }
        TrashCommand::Empty { user, force } => {
            let ctx = RequestContext::new(user.clone());
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Permanently delete everything in the trash of '{user}'?"
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;

                if !confirm {
                    println!("Cancelled.");
                    store.close().await;
                    return Ok(());
                }
            }

            let outcome = service.empty_trash(&ctx).await?;
            output::done(&format!(
                "Deleted {} nodes, released {} assets.",
                outcome.deleted.len(),
                outcome.released_assets
            ));
            for failure in &outcome.release_failures {
                output::warn(&format!(
                    "Asset {} was not released: {}",
                    failure.storage_key, failure.message
                ));
            }
        }
    }

    store.close().await;
    Ok(())
}
