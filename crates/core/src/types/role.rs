//! User roles.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct RoleError(pub String);

/// Account role, stored in the `roles` lookup table.
///
/// Exactly two roles exist; both are created idempotently at bootstrap.
/// The role name is embedded in bearer tokens, so the string forms here
/// ("Admin" / "User") are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full access to catalog writes, order administration, and user removal.
    Admin,
    /// Regular shopper account.
    User,
}

impl Role {
    /// All roles, in bootstrap order.
    pub const ALL: [Self; 2] = [Self::Admin, Self::User];

    /// The database/name form of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "User",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "User" => Ok(Self::User),
            other => Err(RoleError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert!("admin".parse::<Role>().is_err());
        assert!("SuperAdmin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }
}
