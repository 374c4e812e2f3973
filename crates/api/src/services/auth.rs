//! Authentication service.
//!
//! Account creation, login, and the bootstrap admin account. Password
//! hashing is delegated to argon2 (PHC strings carry hash and salt
//! together); token crypto is delegated to the signer.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::ExposeSecret;
use sqlx::PgPool;

use pomelo_core::{Email, EmailError, Role};

use crate::config::ApiConfig;
use crate::db::{RepositoryError, UserRepository};
use crate::models::user::NewUser;
use crate::token::{TokenError, TokenSigner};

/// Username of the bootstrap admin account.
const ADMIN_USERNAME: &str = "Admin";
/// Email of the bootstrap admin account.
const ADMIN_EMAIL: &str = "admin@admin.app";

/// Errors that can occur during authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Username taken.
    #[error("Username taken, cannot create new user account")]
    UserExists,

    /// The configured cap of accounts per email address is reached.
    #[error("The maximum count of user accounts is reached for provided email address")]
    EmailAccountLimit,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Unknown username or wrong password; the two are never distinguished.
    #[error("incorrect credentials")]
    InvalidCredentials,

    /// User not found (delete only; login reports `InvalidCredentials`).
    #[error("Username not found")]
    UserNotFound,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token issuance error.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A signup request, validated at the route boundary.
#[derive(Debug)]
pub struct Signup<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenSigner,
    config: &'a ApiConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenSigner, config: &'a ApiConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
            config,
        }
    }

    /// Register a new user account with the default `User` role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserExists` if the username is taken.
    /// Returns `AuthError::EmailAccountLimit` if the email already carries
    /// the configured maximum number of accounts.
    pub async fn signup(&self, signup: Signup<'_>) -> Result<(), AuthError> {
        self.signup_with_role(signup, Role::User).await
    }

    /// Login with username and password; returns a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown username or a
    /// wrong password, identically for both.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .users
            .find_auth_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        let role: Role = user.role.parse().map_err(|_| {
            AuthError::Repository(RepositoryError::DataCorruption(format!(
                "unknown role in database: {}",
                user.role
            )))
        })?;

        Ok(self.tokens.issue(user.id, role)?)
    }

    /// Ensure the bootstrap admin account exists.
    ///
    /// # Returns
    ///
    /// Returns `true` if the account was created, `false` if it already
    /// existed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the roles have not been
    /// bootstrapped or a query fails.
    pub async fn create_admin(&self) -> Result<bool, AuthError> {
        if self.users.admin_exists().await? {
            return Ok(false);
        }

        let password = self.config.admin_password.expose_secret().to_owned();
        self.signup_with_role(
            Signup {
                first_name: "admin",
                last_name: "admin",
                username: ADMIN_USERNAME,
                email: ADMIN_EMAIL,
                password: &password,
            },
            Role::Admin,
        )
        .await?;

        Ok(true)
    }

    /// Delete a user account by username.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the username is unknown.
    pub async fn delete_user(&self, username: &str) -> Result<(), AuthError> {
        if self.users.delete_by_username(username).await? {
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }

    async fn signup_with_role(&self, signup: Signup<'_>, role: Role) -> Result<(), AuthError> {
        let email = Email::parse(signup.email)?;

        if self.users.username_exists(signup.username).await? {
            return Err(AuthError::UserExists);
        }

        if self.users.email_account_count(&email).await? >= self.config.email_account_cap {
            return Err(AuthError::EmailAccountLimit);
        }

        let password_hash = hash_password(signup.password)?;
        let user_email_id = self.users.find_or_create_email(&email).await?;
        let role_id = self.users.role_id(role).await?;

        // The username has a unique constraint, so a concurrent signup
        // racing past the check above still cannot create a duplicate.
        self.users
            .create(&NewUser {
                first_name: signup.first_name,
                last_name: signup.last_name,
                username: signup.username,
                password_hash: &password_hash,
                user_email_id,
                role_id,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserExists,
                other => AuthError::Repository(other),
            })?;

        Ok(())
    }
}

/// Hash a password into an argon2 PHC string.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC string.
///
/// The comparison inside argon2 is constant-time.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch and
/// `AuthError::PasswordHash` on a malformed stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|e| match e {
            argon2::password_hash::Error::Password => AuthError::InvalidCredentials,
            _ => AuthError::PasswordHash,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash).is_ok());
    }

    #[test]
    fn test_wrong_password_is_invalid_credentials() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(matches!(
            verify_password("hunter3!", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_not_a_mismatch() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::PasswordHash)
        ));
    }
}
