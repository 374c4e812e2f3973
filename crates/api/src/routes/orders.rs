//! Checkout and order handlers.

use axum::extract::{Json, Path, State};
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;

use pomelo_core::{CartId, OrderId, Role};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::response;
use crate::services::orders::OrderService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    status: Option<String>,
}

/// `GET /orders` - users see their own orders, admins see everyone's.
pub async fn list(RequireUser(user): RequireUser, State(state): State<AppState>) -> Result<Response> {
    let service = OrderService::new(state.pool());

    let orders = match user.role {
        Role::Admin => service.get_all_orders().await?,
        Role::User => service.get_user_orders(user.id).await?,
    };

    Ok(response::success(orders))
}

/// `POST /order/{id}` - check out the cart with that id.
pub async fn checkout(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(cart_id): Path<CartId>,
) -> Result<Response> {
    let order_id = OrderService::new(state.pool()).checkout(user.id, cart_id).await?;

    Ok(response::success(json!({
        "message": "Cart checked out, new order placed",
        "orderId": order_id,
    })))
}

/// `PUT /order/{id}` (admin) - move an order to another status.
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Response> {
    let Some(status) = body.status.filter(|s| !s.is_empty()) else {
        return Err(AppError::Validation(json!({ "status": "status is required" })));
    };

    let status = OrderService::new(state.pool())
        .update_status(order_id, &status)
        .await?;

    Ok(response::success(json!({
        "message": format!("Order status set to {status}")
    })))
}
