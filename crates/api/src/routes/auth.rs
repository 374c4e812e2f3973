//! Signup, login, and user removal handlers.

use axum::extract::{Json, Path, State};
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::response;
use crate::services::auth::{AuthService, Signup};
use crate::state::AppState;

use super::require_fields;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

/// `POST /signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Response> {
    let report = require_fields(&[
        ("firstName", body.first_name.as_deref()),
        ("lastName", body.last_name.as_deref()),
        ("username", body.username.as_deref()),
        ("email", body.email.as_deref()),
        ("password", body.password.as_deref()),
    ]);
    if !report.is_empty() {
        return Err(AppError::Validation(report.into()));
    }

    let service = AuthService::new(state.pool(), state.tokens(), state.config());
    service
        .signup(Signup {
            first_name: body.first_name.as_deref().unwrap_or_default(),
            last_name: body.last_name.as_deref().unwrap_or_default(),
            username: body.username.as_deref().unwrap_or_default(),
            email: body.email.as_deref().unwrap_or_default(),
            password: body.password.as_deref().unwrap_or_default(),
        })
        .await?;

    Ok(response::success(json!({
        "message": "You have created an account"
    })))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response> {
    let report = require_fields(&[
        ("username", body.username.as_deref()),
        ("password", body.password.as_deref()),
    ]);
    if !report.is_empty() {
        return Err(AppError::Validation(report.into()));
    }

    let service = AuthService::new(state.pool(), state.tokens(), state.config());
    let token = service
        .login(
            body.username.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(response::success(json!({ "token": token })))
}

/// `DELETE /users/{username}` (admin)
pub async fn delete_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response> {
    let service = AuthService::new(state.pool(), state.tokens(), state.config());
    service.delete_user(&username).await?;

    Ok(response::success(json!({ "message": "User was removed" })))
}
