//! Catalog rows and views.

use rust_decimal::Decimal;
use serde::Serialize;

use pomelo_core::{CategoryId, ItemId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A catalog item row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Item {
    pub id: ItemId,
    pub item_name: String,
    pub image_url: Option<String>,
    pub sku: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: CategoryId,
}

/// An item joined with its category, fetched as one flat row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemWithCategory {
    pub id: ItemId,
    pub item_name: String,
    pub image_url: Option<String>,
    pub sku: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: CategoryId,
    pub category_name: String,
}

impl ItemWithCategory {
    /// Nest the flat row into the response shape.
    #[must_use]
    pub fn into_view(self) -> ItemView {
        ItemView {
            id: self.id,
            item_name: self.item_name,
            image_url: self.image_url,
            sku: self.sku,
            price: self.price,
            stock_quantity: self.stock_quantity,
            category: Category {
                id: self.category_id,
                name: self.category_name,
            },
        }
    }
}

/// Response shape for an item with its category nested.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: ItemId,
    pub item_name: String,
    pub image_url: Option<String>,
    pub sku: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category: Category,
}

/// Parameters for creating an item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub item_name: String,
    pub image_url: Option<String>,
    pub sku: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: CategoryId,
}

/// Partial update: only the provided fields change.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub item_name: Option<String>,
    pub image_url: Option<String>,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub category_id: Option<CategoryId>,
}

impl ItemChanges {
    /// Whether the update would touch anything at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item_name.is_none()
            && self.image_url.is_none()
            && self.sku.is_none()
            && self.price.is_none()
            && self.stock_quantity.is_none()
            && self.category_id.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_item_view_nests_category() {
        let row = ItemWithCategory {
            id: ItemId::new(1),
            item_name: "Thinkpad X1".to_string(),
            image_url: None,
            sku: "LP100".to_string(),
            price: Decimal::new(99_900, 2),
            stock_quantity: 5,
            category_id: CategoryId::new(2),
            category_name: "Laptops".to_string(),
        };

        let view = row.into_view();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["itemName"], "Thinkpad X1");
        assert_eq!(json["stockQuantity"], 5);
        assert_eq!(json["price"], "999.00");
        assert_eq!(json["category"]["name"], "Laptops");
    }

    #[test]
    fn test_item_changes_is_empty() {
        assert!(ItemChanges::default().is_empty());
        assert!(
            !ItemChanges {
                sku: Some("LP101".to_string()),
                ..ItemChanges::default()
            }
            .is_empty()
        );
    }
}
