//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `POMELO_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   the generic `DATABASE_URL`)
//! - `POMELO_TOKEN_SECRET` - Bearer-token signing secret (min 32 chars)
//!
//! ## Optional
//! - `POMELO_HOST` - Bind address (default: 127.0.0.1)
//! - `POMELO_PORT` - Listen port (default: 3000)
//! - `POMELO_TOKEN_TTL_SECS` - Token lifetime in seconds (default: 7200)
//! - `POMELO_EMAIL_ACCOUNT_CAP` - Max accounts sharing one email (default: 4)
//! - `POMELO_ADMIN_PASSWORD` - Bootstrap admin password (default: P@ssword2023)
//! - `POMELO_SEED_URL` - External catalog source for the one-time seed
//!   import; the import is skipped when unset

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer-token signing secret
    pub token_secret: SecretString,
    /// Bearer-token lifetime
    pub token_ttl: Duration,
    /// Maximum number of accounts allowed to share one email address
    pub email_account_cap: i64,
    /// Password assigned to the bootstrap admin account
    pub admin_password: SecretString,
    /// External catalog source for the one-time seed import
    pub seed_url: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the token secret fails validation (length, placeholder detection).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("POMELO_DATABASE_URL")?;
        let host = get_env_or_default("POMELO_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("POMELO_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("POMELO_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("POMELO_PORT".to_string(), e.to_string()))?;

        let token_secret = get_required_secret("POMELO_TOKEN_SECRET")?;
        validate_token_secret(token_secret.expose_secret(), "POMELO_TOKEN_SECRET")?;

        let token_ttl_secs = get_env_or_default("POMELO_TOKEN_TTL_SECS", "7200")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("POMELO_TOKEN_TTL_SECS".to_string(), e.to_string())
            })?;

        let email_account_cap = get_env_or_default("POMELO_EMAIL_ACCOUNT_CAP", "4")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("POMELO_EMAIL_ACCOUNT_CAP".to_string(), e.to_string())
            })?;
        if email_account_cap < 1 {
            return Err(ConfigError::InvalidEnvVar(
                "POMELO_EMAIL_ACCOUNT_CAP".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let admin_password = SecretString::from(get_env_or_default(
            "POMELO_ADMIN_PASSWORD",
            // Known bootstrap credential, meant to be rotated after setup.
            "P@ssword2023",
        ));

        let seed_url = get_optional_env("POMELO_SEED_URL");

        Ok(Self {
            database_url,
            host,
            port,
            token_secret,
            token_ttl: Duration::from_secs(token_ttl_secs),
            email_account_cap,
            admin_password,
            seed_url,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that the token secret is long enough and not a placeholder.
fn validate_token_secret(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_token_secret_too_short() {
        let result = validate_token_secret("short", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_token_secret_placeholder() {
        let result = validate_token_secret(&"changeme".repeat(5), "TEST_VAR");
        assert!(result.is_err());

        let result = validate_token_secret("your-signing-key-goes-right-here-ok", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_token_secret_valid() {
        let result = validate_token_secret("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6-vD8", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            token_secret: SecretString::from("x".repeat(32)),
            token_ttl: Duration::from_secs(7200),
            email_account_cap: 4,
            admin_password: SecretString::from("P@ssword2023"),
            seed_url: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
