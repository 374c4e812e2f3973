//! User repository for database operations.
//!
//! Queries bind at runtime (`sqlx::query_as::<_, T>` / `.bind`), so the
//! crate builds without a live database.

use sqlx::PgPool;

use pomelo_core::{Email, Role, RoleId, UserEmailId, UserId};

use super::RepositoryError;
use crate::models::user::{AuthUser, NewUser};

/// Repository for user and role database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's credential row by username, role name included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_auth_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AuthUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AuthUser>(
            r"
            SELECT u.id, u.password_hash, r.role
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Whether a username is already taken.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn username_exists(&self, username: &str) -> Result<bool, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Count accounts registered against an email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_account_count(&self, email: &Email) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM users u
            JOIN user_emails e ON e.id = u.user_email_id
            WHERE e.email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Get the id for an email address, inserting the row on first use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_or_create_email(&self, email: &Email) -> Result<UserEmailId, RepositoryError> {
        // Upsert keeps this race-free: two concurrent signups with a fresh
        // email both land on the same row.
        let id = sqlx::query_scalar::<_, UserEmailId>(
            r"
            INSERT INTO user_emails (email)
            VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id
            ",
        )
        .bind(email.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser<'_>) -> Result<UserId, RepositoryError> {
        let id = sqlx::query_scalar::<_, UserId>(
            r"
            INSERT INTO users (first_name, last_name, username, password_hash, user_email_id, role_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.user_email_id)
        .bind(user.role_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(id)
    }

    /// Delete a user by username.
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was removed, `false` if the username was
    /// unknown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_by_username(&self, username: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get the id of a role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the role has not been
    /// bootstrapped yet.
    pub async fn role_id(&self, role: Role) -> Result<RoleId, RepositoryError> {
        let id = sqlx::query_scalar::<_, RoleId>("SELECT id FROM roles WHERE role = $1")
            .bind(role.as_str())
            .fetch_optional(self.pool)
            .await?;

        id.ok_or(RepositoryError::NotFound)
    }

    /// Ensure a role row exists.
    ///
    /// # Returns
    ///
    /// Returns `true` if the row was created, `false` if it already existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure_role(&self, role: Role) -> Result<bool, RepositoryError> {
        let result = sqlx::query("INSERT INTO roles (role) VALUES ($1) ON CONFLICT (role) DO NOTHING")
            .bind(role.as_str())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether any account carries the `Admin` role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn admin_exists(&self) -> Result<bool, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE r.role = $1
            ",
        )
        .bind(Role::Admin.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(count > 0)
    }
}
