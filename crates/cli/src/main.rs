//! Papergift CLI - Session table migration and operational checks.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table in the storefront database
//! papergift-cli migrate
//!
//! # Check that the backend API answers its health endpoint
//! papergift-cli check-backend
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create the `tower_sessions` schema and table
//! - `check-backend` - `GET /health` on `BACKEND_API_URL`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "papergift-cli")]
#[command(author, version, about = "Papergift CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the session table in the storefront database
    Migrate,
    /// Check that the backend API is reachable
    CheckBackend,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::sessions().await?,
        Commands::CheckBackend => commands::backend::check().await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_check_backend() {
        let cli = Cli::try_parse_from(["papergift-cli", "check-backend"]);
        assert!(matches!(cli.map(|c| c.command), Ok(Commands::CheckBackend)));
    }
}
