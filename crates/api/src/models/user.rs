//! User rows.

use pomelo_core::{RoleId, UserEmailId, UserId};

/// Credential row fetched at login: the user joined with their role name.
///
/// The role is kept as the raw name here; the auth service parses it and
/// treats an unknown name as data corruption.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthUser {
    /// User id.
    pub id: UserId,
    /// Argon2 PHC string (hash and salt together).
    pub password_hash: String,
    /// Role name from the `roles` table.
    pub role: String,
}

/// Parameters for creating a user.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub username: &'a str,
    /// Argon2 PHC string.
    pub password_hash: &'a str,
    pub user_email_id: UserEmailId,
    pub role_id: RoleId,
}
