//! Order rows, views, and totals.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use pomelo_core::{ItemId, OrderId, OrderItemId, UserId};

/// A bare order row with its status name resolved.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderHead {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: String,
    pub discount: i32,
}

/// One order line joined with its order, item, and category.
///
/// Order listings fetch these flat rows and regroup them into nested
/// [`OrderView`]s; an order with three lines contributes three rows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderLineDetail {
    pub order_id: OrderId,
    pub order_created_at: DateTime<Utc>,
    pub status: String,
    pub discount: i32,
    pub user_id: UserId,
    pub user_name: String,
    pub line_id: OrderItemId,
    pub amount: i32,
    /// Unit price snapshot taken at checkout.
    pub unit_price: Decimal,
    pub item_id: ItemId,
    pub item_name: String,
    pub sku: String,
    pub image_url: Option<String>,
    pub category_name: String,
}

/// Response shape for an order with nested lines and a computed total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub status: String,
    /// Loyalty discount percentage captured at checkout.
    pub discount: i32,
    /// Sum of line totals with the discount applied.
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<OrderCustomer>,
    pub order_items: Vec<OrderLineView>,
}

/// Who placed the order (admin listing only).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub id: UserId,
    pub full_name: String,
}

/// Response shape for a single order line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub id: OrderItemId,
    pub amount: i32,
    pub unit_price: Decimal,
    pub item: OrderItemRef,
}

/// The item snapshot referenced by an order line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRef {
    pub id: ItemId,
    pub item_name: String,
    pub sku: String,
    pub image_url: Option<String>,
    pub category: String,
}

/// Order total: sum of `amount x unit_price` with the discount applied,
/// rounded to two decimals.
#[must_use]
pub fn order_total(lines: &[(i32, Decimal)], discount: i32) -> Decimal {
    let gross: Decimal = lines
        .iter()
        .map(|(amount, unit_price)| Decimal::from(*amount) * unit_price)
        .sum();
    let rate = Decimal::ONE - Decimal::from(discount) / Decimal::from(100);
    (gross * rate).round_dp(2)
}

/// Regroup flat line rows into nested order views, newest order first as
/// ordered by the query. `include_customer` controls whether the purchaser
/// appears (admin listing) or not (a user's own orders).
#[must_use]
pub fn group_orders(rows: Vec<OrderLineDetail>, include_customer: bool) -> Vec<OrderView> {
    let mut orders: Vec<OrderView> = Vec::new();

    for row in rows {
        let line = OrderLineView {
            id: row.line_id,
            amount: row.amount,
            unit_price: row.unit_price,
            item: OrderItemRef {
                id: row.item_id,
                item_name: row.item_name,
                sku: row.sku,
                image_url: row.image_url,
                category: row.category_name,
            },
        };

        match orders.iter().position(|o| o.id == row.order_id) {
            Some(index) => {
                if let Some(order) = orders.get_mut(index) {
                    order.order_items.push(line);
                }
            }
            None => orders.push(OrderView {
                id: row.order_id,
                created_at: row.order_created_at,
                status: row.status,
                discount: row.discount,
                total: Decimal::ZERO,
                user: include_customer.then(|| OrderCustomer {
                    id: row.user_id,
                    full_name: row.user_name,
                }),
                order_items: vec![line],
            }),
        }
    }

    for order in &mut orders {
        let lines: Vec<(i32, Decimal)> = order
            .order_items
            .iter()
            .map(|l| (l.amount, l.unit_price))
            .collect();
        order.total = order_total(&lines, order.discount);
    }

    orders
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(order_id: i32, line_id: i32, amount: i32, unit_price: Decimal) -> OrderLineDetail {
        OrderLineDetail {
            order_id: OrderId::new(order_id),
            order_created_at: Utc::now(),
            status: "IN PROCESS".to_string(),
            discount: 0,
            user_id: UserId::new(1),
            user_name: "Ada Lovelace".to_string(),
            line_id: OrderItemId::new(line_id),
            amount,
            unit_price,
            item_id: ItemId::new(line_id),
            item_name: format!("item-{line_id}"),
            sku: format!("SKU{line_id}"),
            image_url: None,
            category_name: "Laptops".to_string(),
        }
    }

    #[test]
    fn test_order_total_no_discount() {
        let lines = [(3, Decimal::new(100_000, 2))];
        assert_eq!(order_total(&lines, 0), Decimal::new(300_000, 2));
    }

    #[test]
    fn test_order_total_with_discount() {
        // 2 x 50.00 + 1 x 100.00 = 200.00, minus 30% = 140.00
        let lines = [(2, Decimal::new(5_000, 2)), (1, Decimal::new(10_000, 2))];
        assert_eq!(order_total(&lines, 30), Decimal::new(14_000, 2));
    }

    #[test]
    fn test_order_total_rounds_to_cents() {
        // 1 x 9.99 minus 10% = 8.991 -> 8.99
        let lines = [(1, Decimal::new(999, 2))];
        assert_eq!(order_total(&lines, 10), Decimal::new(899, 2));
    }

    #[test]
    fn test_group_orders_regroups_lines() {
        let rows = vec![
            row(1, 1, 2, Decimal::new(5_000, 2)),
            row(1, 2, 1, Decimal::new(10_000, 2)),
            row(2, 3, 1, Decimal::new(999, 2)),
        ];

        let orders = group_orders(rows, false);
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_items.len(), 2);
        assert_eq!(orders[0].total, Decimal::new(20_000, 2));
        assert_eq!(orders[1].order_items.len(), 1);
        assert!(orders[0].user.is_none());
    }

    #[test]
    fn test_group_orders_admin_includes_customer() {
        let orders = group_orders(vec![row(1, 1, 1, Decimal::ONE)], true);
        let customer = orders[0].user.as_ref().unwrap();
        assert_eq!(customer.full_name, "Ada Lovelace");

        let json = serde_json::to_value(&orders[0]).unwrap();
        assert_eq!(json["user"]["fullName"], "Ada Lovelace");
        assert_eq!(json["orderItems"][0]["item"]["category"], "Laptops");
    }
}
