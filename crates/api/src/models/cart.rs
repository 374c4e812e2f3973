//! Cart rows and views.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use pomelo_core::{CartId, CartItemId, CategoryId, ItemId, UserId};

use super::catalog::{Category, ItemView};

/// A cart row. One per user, created lazily, never deleted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A bare cart line row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLine {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub item_id: ItemId,
    pub amount: i32,
    /// Line price snapshot: amount x item price at add/update time.
    pub price: Decimal,
}

/// A cart line joined with its item and category, fetched as one flat row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLineDetail {
    pub id: CartItemId,
    pub amount: i32,
    pub price: Decimal,
    pub item_id: ItemId,
    pub item_name: String,
    pub image_url: Option<String>,
    pub sku: String,
    /// The item's current unit price (not the line snapshot).
    pub item_price: Decimal,
    pub stock_quantity: i32,
    pub category_id: CategoryId,
    pub category_name: String,
}

/// Response shape for a cart with nested lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: CartId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cart_items: Vec<CartLineView>,
}

/// Response shape for a single cart line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub id: CartItemId,
    pub amount: i32,
    pub price: Decimal,
    pub item: ItemView,
}

impl CartView {
    /// Assemble the response shape from a cart row and its line rows.
    #[must_use]
    pub fn assemble(cart: Cart, lines: Vec<CartLineDetail>) -> Self {
        Self {
            id: cart.id,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
            cart_items: lines.into_iter().map(CartLineDetail::into_view).collect(),
        }
    }
}

impl CartLineDetail {
    fn into_view(self) -> CartLineView {
        CartLineView {
            id: self.id,
            amount: self.amount,
            price: self.price,
            item: ItemView {
                id: self.item_id,
                item_name: self.item_name,
                image_url: self.image_url,
                sku: self.sku,
                price: self.item_price,
                stock_quantity: self.stock_quantity,
                category: Category {
                    id: self.category_id,
                    name: self.category_name,
                },
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_view_shape() {
        let cart = Cart {
            id: CartId::new(9),
            user_id: UserId::new(3),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let lines = vec![CartLineDetail {
            id: CartItemId::new(1),
            amount: 3,
            price: Decimal::new(300_000, 2),
            item_id: ItemId::new(4),
            item_name: "Thinkpad X1".to_string(),
            image_url: Some("https://img.example/x1.png".to_string()),
            sku: "LP100".to_string(),
            item_price: Decimal::new(100_000, 2),
            stock_quantity: 5,
            category_id: CategoryId::new(2),
            category_name: "Laptops".to_string(),
        }];

        let json = serde_json::to_value(CartView::assemble(cart, lines)).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["cartItems"][0]["amount"], 3);
        assert_eq!(json["cartItems"][0]["price"], "3000.00");
        assert_eq!(json["cartItems"][0]["item"]["sku"], "LP100");
        assert_eq!(json["cartItems"][0]["item"]["category"]["name"], "Laptops");
        // The user id is not part of the response shape.
        assert!(json.get("userId").is_none());
    }
}
