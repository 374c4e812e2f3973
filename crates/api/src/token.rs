//! Bearer-token signing and verification.
//!
//! Tokens are HS256 JWTs carrying the user id and role. Token crypto is
//! treated as opaque here: everything interesting lives in `jsonwebtoken`.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use pomelo_core::{Role, UserId};

/// Errors from token verification or issuance.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token's expiry has passed.
    #[error("token has expired")]
    Expired,
    /// The token is malformed, has a bad signature, or carries bad claims.
    #[error("invalid token")]
    Invalid,
}

/// Claims embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    /// Role name ("Admin" / "User").
    pub role: Role,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: std::time::Duration,
}

impl TokenSigner {
    /// Create a signer from the configured secret and token lifetime.
    #[must_use]
    pub fn new(secret: &[u8], ttl: std::time::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if signing fails.
    pub fn issue(&self, user_id: UserId, role: Role) -> Result<String, TokenError> {
        let exp = Utc::now().timestamp() + i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user_id.as_i32(),
            role,
            exp,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for a stale token and
    /// `TokenError::Invalid` for anything else that fails validation.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn signer() -> TokenSigner {
        TokenSigner::new(SECRET, Duration::from_secs(7200))
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let signer = signer();
        let token = signer.issue(UserId::new(42), Role::User).unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::User);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_admin_role_survives_roundtrip() {
        let signer = signer();
        let token = signer.issue(UserId::new(1), Role::Admin).unwrap();
        assert_eq!(signer.verify(&token).unwrap().role, Role::Admin);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = signer().issue(UserId::new(1), Role::User).unwrap();

        let other = TokenSigner::new(b"another-key-another-key-another!", Duration::from_secs(60));
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            signer().verify("not.a.token"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_expired_rejected() {
        // Issue an already-stale token (past the default 60s leeway).
        let claims = Claims {
            sub: 1,
            role: Role::User,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(
            signer().verify(&token),
            Err(TokenError::Expired)
        ));
    }
}
