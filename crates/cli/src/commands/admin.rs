//! Admin account command.

use secrecy::ExposeSecret;

use pomelo_api::config::{ApiConfig, ConfigError};
use pomelo_api::db;
use pomelo_api::services::auth::{AuthError, AuthService};
use pomelo_api::token::TokenSigner;

/// Errors that can occur while managing the admin account.
#[derive(Debug, thiserror::Error)]
pub enum AdminCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Ensure the bootstrap admin account exists.
///
/// Requires roles to be bootstrapped first (`pomelo-cli bootstrap` does
/// both in one go).
///
/// # Errors
///
/// Returns `AdminCommandError` if configuration is incomplete, the
/// database is unreachable, or account creation fails.
pub async fn create() -> Result<(), AdminCommandError> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    let tokens = TokenSigner::new(
        config.token_secret.expose_secret().as_bytes(),
        config.token_ttl,
    );

    let created = AuthService::new(&pool, &tokens, &config).create_admin().await?;

    if created {
        tracing::info!("Admin account was created");
    } else {
        tracing::info!("Admin account already exists");
    }

    Ok(())
}
