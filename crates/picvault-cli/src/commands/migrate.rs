//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use picvault_core::config::AppConfig;
use picvault_core::error::AppError;
use picvault_database::DatabasePool;
use picvault_database::migration::{applied_versions, embedded_migrations, run_migrations};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Show migration status
    Status,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    if config.database.provider != "postgres" {
        return Err(AppError::configuration(format!(
            "Migrations need the postgres provider, not '{}'",
            config.database.provider
        )));
    }
    let pool = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            run_migrations(pool.pool()).await?;
            output::done("All migrations applied successfully.");
        }
        MigrateCommand::Status => {
            let applied = applied_versions(pool.pool()).await?;
            println!("Migration status:");
            for (version, description) in embedded_migrations() {
                let status = if applied.contains(&version) {
                    "applied"
                } else {
                    "pending"
                };
                println!("  {version} - {description} ({status})");
            }
        }
    }

    pool.close().await;
    Ok(())
}
