//! Category handlers. Writes are admin-only.

use axum::extract::{Json, Path, State};
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;

use pomelo_core::CategoryId;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::response;
use crate::services::catalog::CatalogService;
use crate::state::AppState;

use super::require_fields;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    name: Option<String>,
}

/// `GET /categories`
pub async fn list(State(state): State<AppState>) -> Result<Response> {
    let categories = CatalogService::new(state.pool()).list_categories().await?;
    Ok(response::success(categories))
}

/// `POST /categories` (admin)
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CategoryRequest>,
) -> Result<Response> {
    let name = required_name(&body)?;

    CatalogService::new(state.pool()).create_category(name).await?;
    Ok(response::success(json!({ "message": "Category created" })))
}

/// `PUT /categories/{id}` (admin)
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(body): Json<CategoryRequest>,
) -> Result<Response> {
    let name = required_name(&body)?;

    CatalogService::new(state.pool()).update_category(id, name).await?;
    Ok(response::success(json!({ "message": "Category was updated" })))
}

/// `DELETE /categories/{id}` (admin)
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Response> {
    CatalogService::new(state.pool()).delete_category(id).await?;
    Ok(response::success(json!({ "message": "Category was deleted" })))
}

fn required_name(body: &CategoryRequest) -> Result<&str> {
    let report = require_fields(&[("name", body.name.as_deref())]);
    if report.is_empty() {
        Ok(body.name.as_deref().unwrap_or_default())
    } else {
        Err(AppError::Validation(report.into()))
    }
}
