//! Development token commands.

use chrono::{Duration, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::output::{self, OutputFormat};
use picvault_auth::JwtEncoder;
use picvault_core::config::AppConfig;
use picvault_core::error::AppError;

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Issue a bearer token signed with `auth.jwt_secret`
    Issue {
        /// Subject (owner id)
        #[arg(short, long)]
        user: String,
        /// Display name claim
        #[arg(short, long)]
        name: Option<String>,
        /// Lifetime in minutes; defaults to `auth.dev_token_ttl_minutes`
        #[arg(short, long)]
        ttl_minutes: Option<i64>,
    },
}

#[derive(Debug, Serialize)]
struct IssuedToken {
    token: String,
    subject: String,
    expires_at: String,
}

/// Execute token commands
pub fn execute(args: &TokenArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        TokenCommand::Issue {
            user,
            name,
            ttl_minutes,
        } => {
            let minutes = ttl_minutes.unwrap_or(config.auth.dev_token_ttl_minutes);
            if minutes <= 0 {
                return Err(AppError::invalid_argument("TTL must be positive"));
            }
            let ttl = Duration::minutes(minutes);
            let encoder = JwtEncoder::new(&config.auth);
            let token = encoder.issue_with_ttl(user, name.as_deref(), ttl)?;

            match format {
                OutputFormat::Json => output::print_json(&IssuedToken {
                    token,
                    subject: user.clone(),
                    expires_at: (Utc::now() + ttl).to_rfc3339(),
                }),
                OutputFormat::Table => println!("{token}"),
            }
        }
    }
    Ok(())
}
