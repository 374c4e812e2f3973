//! Pomelo CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pomelo-cli migrate
//!
//! # Bootstrap reference data, admin account, and the seed catalog
//! pomelo-cli bootstrap
//!
//! # Ensure the bootstrap admin account exists
//! pomelo-cli admin create
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `bootstrap` - Idempotent setup of roles, order statuses, admin, seed data
//! - `admin create` - Ensure the bootstrap admin account exists

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pomelo-cli")]
#[command(author, version, about = "Pomelo CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Bootstrap reference data, the admin account, and the seed catalog
    Bootstrap,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Ensure the bootstrap admin account exists
    Create,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Bootstrap => commands::bootstrap::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create => commands::admin::create().await?,
        },
    }
    Ok(())
}
