//! Item handlers. Writes are admin-only.

use axum::extract::{Json, Path, State};
use axum::response::Response;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use pomelo_core::{CategoryId, ItemId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::catalog::{ItemChanges, NewItem};
use crate::response;
use crate::services::catalog::CatalogService;
use crate::state::AppState;

use super::require_fields;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    item_name: Option<String>,
    image_url: Option<String>,
    sku: Option<String>,
    price: Option<Decimal>,
    stock_quantity: Option<i32>,
    category_id: Option<CategoryId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    item_name: Option<String>,
    image_url: Option<String>,
    sku: Option<String>,
    price: Option<Decimal>,
    stock_quantity: Option<i32>,
    category_id: Option<CategoryId>,
}

/// `GET /items`
pub async fn list(State(state): State<AppState>) -> Result<Response> {
    let items = CatalogService::new(state.pool()).list_items().await?;
    Ok(response::success(items))
}

/// `POST /items` (admin)
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateItemRequest>,
) -> Result<Response> {
    let mut report = require_fields(&[
        ("itemName", body.item_name.as_deref()),
        ("sku", body.sku.as_deref()),
    ]);
    if body.price.is_none() {
        report.insert("price".to_owned(), json!("price is required"));
    }
    if body.category_id.is_none() {
        report.insert("categoryId".to_owned(), json!("categoryId is required"));
    }
    validate_amounts(&mut report, body.price, body.stock_quantity);
    if !report.is_empty() {
        return Err(AppError::Validation(report.into()));
    }

    let created = CatalogService::new(state.pool())
        .create_item(NewItem {
            item_name: body.item_name.unwrap_or_default(),
            image_url: body.image_url,
            sku: body.sku.unwrap_or_default(),
            price: body.price.unwrap_or_default(),
            stock_quantity: body.stock_quantity.unwrap_or(0),
            category_id: body.category_id.unwrap_or(CategoryId::new(0)),
        })
        .await?;

    let mut data = json!({ "message": "Item created", "id": created.id });
    if created.name_taken {
        data["warning"] = json!("An item with the same name exists in database");
    }

    Ok(response::success(data))
}

/// `PUT /items/{id}` (admin)
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Response> {
    let mut report = serde_json::Map::new();
    validate_amounts(&mut report, body.price, body.stock_quantity);
    if !report.is_empty() {
        return Err(AppError::Validation(report.into()));
    }

    CatalogService::new(state.pool())
        .update_item(
            id,
            ItemChanges {
                item_name: body.item_name,
                image_url: body.image_url,
                sku: body.sku,
                price: body.price,
                stock_quantity: body.stock_quantity,
                category_id: body.category_id,
            },
        )
        .await?;

    Ok(response::success(json!({ "message": "Item was updated" })))
}

/// `DELETE /items/{id}` (admin)
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
) -> Result<Response> {
    CatalogService::new(state.pool()).delete_item(id).await?;
    Ok(response::success(json!({ "message": "Item was deleted" })))
}

fn validate_amounts(
    report: &mut serde_json::Map<String, serde_json::Value>,
    price: Option<Decimal>,
    stock_quantity: Option<i32>,
) {
    if price.is_some_and(|p| p < Decimal::ZERO) {
        report.insert("price".to_owned(), json!("price can not be negative"));
    }
    if stock_quantity.is_some_and(|q| q < 0) {
        report.insert(
            "stockQuantity".to_owned(),
            json!("stockQuantity can not be negative"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amounts_rejects_negatives() {
        let mut report = serde_json::Map::new();
        validate_amounts(&mut report, Some(Decimal::new(-1, 2)), Some(-3));
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_validate_amounts_accepts_zero() {
        let mut report = serde_json::Map::new();
        validate_amounts(&mut report, Some(Decimal::ZERO), Some(0));
        assert!(report.is_empty());
    }
}
