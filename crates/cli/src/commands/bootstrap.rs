//! Bootstrap command: reference data, admin account, seed catalog.
//!
//! Drives the same idempotent bootstrap as `POST /setup`, for environments
//! where setup runs from a shell instead of an HTTP call.

use secrecy::ExposeSecret;

use pomelo_api::config::{ApiConfig, ConfigError};
use pomelo_api::db;
use pomelo_api::services::bootstrap::{BootstrapError, BootstrapService};
use pomelo_api::token::TokenSigner;

/// Errors that can occur during a CLI bootstrap run.
#[derive(Debug, thiserror::Error)]
pub enum CliBootstrapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}

/// Run the bootstrap and log the report.
///
/// # Errors
///
/// Returns `CliBootstrapError` if configuration is incomplete, the database
/// is unreachable, or a bootstrap write fails.
pub async fn run() -> Result<(), CliBootstrapError> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    let tokens = TokenSigner::new(
        config.token_secret.expose_secret().as_bytes(),
        config.token_ttl,
    );

    let report = BootstrapService::new(&pool, &tokens, &config).run().await?;

    for line in &report.roles {
        tracing::info!("{line}");
    }
    for line in &report.order_statuses {
        tracing::info!("{line}");
    }
    tracing::info!("{}", report.admin_account);
    tracing::info!("{}", report.seed);
    tracing::info!("Bootstrap complete!");

    Ok(())
}
