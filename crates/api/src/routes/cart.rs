//! Cart handlers. All cart routes act on the bearer identity's own cart.

use axum::extract::{Json, Path, State};
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;

use pomelo_core::{CartId, CartItemId, ItemId};

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::response;
use crate::services::cart::CartService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    item_id: Option<ItemId>,
    amount: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    new_amount: Option<i32>,
}

/// `GET /cart`
pub async fn show(RequireUser(user): RequireUser, State(state): State<AppState>) -> Result<Response> {
    let cart = CartService::new(state.pool()).get_cart(user.id).await?;
    Ok(response::success(json!({ "cart": cart })))
}

/// `POST /cart_item`
pub async fn add_item(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<AddCartItemRequest>,
) -> Result<Response> {
    let mut report = serde_json::Map::new();
    if body.item_id.is_none() {
        report.insert("itemId".to_owned(), json!("itemId is required"));
    }
    if body.amount.is_some_and(|a| a < 1) {
        report.insert("amount".to_owned(), json!("amount must be at least 1"));
    }
    if !report.is_empty() {
        return Err(AppError::Validation(report.into()));
    }

    CartService::new(state.pool())
        .add_item(user.id, body.item_id.unwrap_or(ItemId::new(0)), body.amount)
        .await?;

    Ok(response::success(json!({ "message": "Item(s) added to cart" })))
}

/// `PUT /cart_item/{id}`
pub async fn update_item(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
    Json(body): Json<UpdateCartItemRequest>,
) -> Result<Response> {
    let Some(new_amount) = body.new_amount else {
        return Err(AppError::Validation(
            json!({ "newAmount": "newAmount is required" }),
        ));
    };
    if new_amount < 1 {
        return Err(AppError::Validation(
            json!({ "newAmount": "newAmount must be at least 1" }),
        ));
    }

    CartService::new(state.pool())
        .update_item(user.id, id, new_amount)
        .await?;

    Ok(response::success(json!({ "message": "Cart item was updated" })))
}

/// `DELETE /cart_item/{id}`
pub async fn remove_item(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
) -> Result<Response> {
    CartService::new(state.pool()).remove_item(user.id, id).await?;
    Ok(response::success(json!({ "message": "Cart item was removed" })))
}

/// `DELETE /cart/{id}`
pub async fn clear(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<CartId>,
) -> Result<Response> {
    CartService::new(state.pool()).clear_cart(user.id, id).await?;
    Ok(response::success(json!({
        "message": "All items were removed from cart"
    })))
}
