//! Authentication extractors.
//!
//! Route handlers opt into protection by taking [`RequireUser`] or
//! [`RequireAdmin`] as an argument. Both read the `Authorization: Bearer`
//! header and verify the token against the application state.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

use pomelo_core::{Role, UserId};

use crate::response;
use crate::state::AppState;
use crate::token::TokenError;

/// The authenticated caller, decoded from the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, user {}!", user.id)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires a valid bearer token carrying the `Admin` role.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when a protected route rejects the caller.
pub enum AuthRejection {
    /// No usable `Authorization: Bearer` header.
    Missing,
    /// The token's expiry has passed.
    Expired,
    /// The token failed verification.
    Invalid,
    /// Valid token, wrong role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Missing => {
                response::fail_message(StatusCode::UNAUTHORIZED, "User not authorized")
            }
            Self::Expired => {
                response::fail_message(StatusCode::UNAUTHORIZED, "Token has expired!")
            }
            Self::Invalid => {
                response::fail_message(StatusCode::UNAUTHORIZED, "Invalid token was provided!")
            }
            Self::Forbidden => response::fail_message(StatusCode::FORBIDDEN, "Restricted access..."),
        }
    }
}

/// Pull the token out of an `Authorization` header value.
fn bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<CurrentUser, AuthRejection> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = bearer_token(header).ok_or(AuthRejection::Missing)?;

    let claims = state.tokens().verify(token).map_err(|e| match e {
        TokenError::Expired => AuthRejection::Expired,
        TokenError::Invalid => AuthRejection::Invalid,
    })?;

    Ok(CurrentUser {
        id: UserId::new(claims.sub),
        role: claims.role,
    })
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if user.role != Role::Admin {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parses_well_formed_header() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(Some("Bearer  padded ")), Some("padded"));
    }

    #[test]
    fn test_bearer_token_rejects_bad_headers() {
        assert_eq!(bearer_token(None), None);
        assert_eq!(bearer_token(Some("")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(Some("bearer lowercase-scheme")), None);
    }

    #[test]
    fn test_rejection_status_codes() {
        assert_eq!(
            AuthRejection::Missing.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Expired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Invalid.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
