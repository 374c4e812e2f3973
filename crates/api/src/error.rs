//! Unified error handling.
//!
//! Provides a unified `AppError` type that maps every typed domain error to
//! an HTTP status code and response envelope in one place. All route
//! handlers return `Result<T, AppError>`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::response;
use crate::services::auth::AuthError;
use crate::services::bootstrap::BootstrapError;
use crate::services::cart::CartError;
use crate::services::catalog::CatalogError;
use crate::services::orders::OrderError;
use crate::services::search::SearchError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Checkout/order operation failed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Catalog search failed.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Bootstrap failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    /// Database operation failed outside a service.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Request input failed validation; carries a field -> message map.
    #[error("validation failed")]
    Validation(serde_json::Value),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(err) => auth_response(err),
            Self::Catalog(err) => catalog_response(err),
            Self::Cart(err) => cart_response(err),
            Self::Order(err) => order_response(err),
            Self::Search(err) => search_response(err),
            Self::Bootstrap(err) => internal(&err),
            Self::Repository(err) => repository_response(err),
            Self::Validation(fields) => response::fail(StatusCode::BAD_REQUEST, fields),
        }
    }
}

fn auth_response(err: AuthError) -> Response {
    match err {
        // Absent user and bad password answer identically so the response
        // leaks nothing about which usernames exist.
        AuthError::InvalidCredentials => {
            response::fail_message(StatusCode::BAD_REQUEST, "Username or password is incorrect")
        }
        AuthError::UserExists | AuthError::EmailAccountLimit => {
            response::fail_message(StatusCode::BAD_REQUEST, err.to_string())
        }
        AuthError::InvalidEmail(e) => {
            response::fail(StatusCode::BAD_REQUEST, json!({ "email": e.to_string() }))
        }
        AuthError::UserNotFound => {
            response::fail_message(StatusCode::NOT_FOUND, err.to_string())
        }
        AuthError::PasswordHash | AuthError::Token(_) | AuthError::Repository(_) => internal(&err),
    }
}

fn catalog_response(err: CatalogError) -> Response {
    match err {
        CatalogError::CategoryNotFound | CatalogError::ItemNotFound => {
            response::fail_message(StatusCode::NOT_FOUND, err.to_string())
        }
        CatalogError::CategoryExists
        | CatalogError::SkuExists
        | CatalogError::UnknownCategory => {
            response::fail_message(StatusCode::BAD_REQUEST, err.to_string())
        }
        CatalogError::CategoryInUse => {
            response::fail_message(StatusCode::CONFLICT, err.to_string())
        }
        // Renaming a category to its current name: not an error, not quite
        // a success either. Accepted, nothing changed.
        CatalogError::UnchangedName => response::success_at(
            StatusCode::ACCEPTED,
            json!({ "message": CatalogError::UnchangedName.to_string() }),
        ),
        CatalogError::Repository(_) => internal(&err),
    }
}

fn cart_response(err: CartError) -> Response {
    match err {
        CartError::CartNotFound | CartError::ItemNotFound | CartError::LineNotFound => {
            response::fail_message(StatusCode::NOT_FOUND, err.to_string())
        }
        CartError::AlreadyInCart | CartError::OutOfStock(_) => {
            response::fail_message(StatusCode::BAD_REQUEST, err.to_string())
        }
        CartError::Repository(_) => internal(&err),
    }
}

fn order_response(err: OrderError) -> Response {
    match err {
        OrderError::CartNotFound | OrderError::EmptyCart | OrderError::OrderNotFound => {
            response::fail_message(StatusCode::NOT_FOUND, err.to_string())
        }
        OrderError::OutOfStock(_) | OrderError::InvalidStatus(_) => {
            response::fail_message(StatusCode::BAD_REQUEST, err.to_string())
        }
        OrderError::AlreadyFinal(_) => response::fail_message(StatusCode::CONFLICT, err.to_string()),
        OrderError::Repository(_) => internal(&err),
    }
}

fn search_response(err: SearchError) -> Response {
    match err {
        SearchError::NoCriteria | SearchError::NoMatch => {
            response::fail_message(StatusCode::NOT_FOUND, err.to_string())
        }
        SearchError::Repository(_) => internal(&err),
    }
}

fn repository_response(err: RepositoryError) -> Response {
    match err {
        RepositoryError::NotFound => {
            response::fail_message(StatusCode::NOT_FOUND, "Content not found")
        }
        RepositoryError::Conflict(msg) => response::fail_message(StatusCode::CONFLICT, msg),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => internal(&err),
    }
}

/// Log the real error, answer with a generic 500.
fn internal(err: &dyn std::error::Error) -> Response {
    tracing::error!(error = %err, "Request error");
    response::error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(
            status_of(AuthError::InvalidCredentials.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AuthError::UserExists.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AuthError::EmailAccountLimit.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AuthError::UserNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AuthError::PasswordHash.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_catalog_status_codes() {
        assert_eq!(
            status_of(CatalogError::CategoryNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CatalogError::SkuExists.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CatalogError::CategoryInUse.into()),
            StatusCode::CONFLICT
        );
        // The rename-to-same-name easter egg is accepted, not rejected.
        assert_eq!(
            status_of(CatalogError::UnchangedName.into()),
            StatusCode::ACCEPTED
        );
    }

    #[test]
    fn test_cart_and_order_status_codes() {
        assert_eq!(
            status_of(CartError::AlreadyInCart.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CartError::OutOfStock("out".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CartError::LineNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(OrderError::EmptyCart.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(OrderError::InvalidStatus("SHIPPED".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(OrderError::AlreadyFinal(pomelo_core::OrderStatus::Complete).into()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_search_and_validation_status_codes() {
        assert_eq!(
            status_of(SearchError::NoCriteria.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(SearchError::NoMatch.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Validation(json!({ "name": "required" }))),
            StatusCode::BAD_REQUEST
        );
    }
}
