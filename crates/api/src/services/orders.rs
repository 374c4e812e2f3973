//! Checkout and order service.
//!
//! Checkout converts a cart into an order inside a single transaction:
//! stock validation, stock decrement, discount capture, order creation,
//! and cart clearing either all happen or none do. Item rows are locked
//! for the duration, so two checkouts racing for the last unit serialize
//! instead of overselling.

use rust_decimal::Decimal;
use sqlx::PgPool;

use pomelo_core::{CartId, ItemId, OrderId, OrderStatus, OrderStatusId, UserId, loyalty_discount};

use crate::db::{OrderRepository, RepositoryError};
use crate::models::order::{OrderView, group_orders};

/// Errors that can occur during checkout and order operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The cart does not exist or belongs to another user.
    #[error("Provided cart ID does not exist for user")]
    CartNotFound,

    /// The cart has no lines to check out.
    #[error("Cart does not contain any cart items. Checkout not available")]
    EmptyCart,

    /// A line's item cannot cover the requested amount.
    #[error("{0}")]
    OutOfStock(String),

    /// Order id is unknown.
    #[error("Order does not exist")]
    OrderNotFound,

    /// The status name maps to none of the enumerated statuses.
    #[error("'{0}' is not a valid order status")]
    InvalidStatus(String),

    /// The order already reached a terminal status.
    #[error("Order is already {0} and can not change status")]
    AlreadyFinal(OrderStatus),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One cart line with its item, as read under lock during checkout.
#[derive(Debug, sqlx::FromRow)]
struct CheckoutLine {
    amount: i32,
    item_id: ItemId,
    sku: String,
    price: Decimal,
    stock_quantity: i32,
}

/// Checkout and order service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
        }
    }

    /// Check out a cart into a new `IN PROCESS` order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::CartNotFound` if the cart is absent or not the
    /// user's, `OrderError::EmptyCart` for a cart with no lines, and
    /// `OrderError::OutOfStock` if any line exceeds current stock - in
    /// which case nothing has been mutated.
    pub async fn checkout(&self, user_id: UserId, cart_id: CartId) -> Result<OrderId, OrderError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let cart_owned = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM carts WHERE id = $1 AND user_id = $2",
        )
        .bind(cart_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        if cart_owned == 0 {
            return Err(OrderError::CartNotFound);
        }

        // Lock the item rows in id order; concurrent checkouts touching the
        // same items queue behind these locks instead of double-spending
        // stock.
        let lines = sqlx::query_as::<_, CheckoutLine>(
            r"
            SELECT ci.amount, i.id AS item_id, i.sku, i.price, i.stock_quantity
            FROM cart_items ci
            JOIN items i ON i.id = ci.item_id
            WHERE ci.cart_id = $1
            ORDER BY i.id
            FOR UPDATE OF i
            ",
        )
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        // Every line is validated before any stock moves; the transaction
        // is dropped (rolled back) on the first failure.
        for line in &lines {
            if line.stock_quantity <= 0 {
                return Err(OrderError::OutOfStock(format!(
                    "Item out of stock -- Sku: {}, ID: {}",
                    line.sku, line.item_id
                )));
            }
            if line.amount > line.stock_quantity {
                return Err(OrderError::OutOfStock(format!(
                    "Requested item amount exceeds stock quantity -- Sku: {}, ID: {}",
                    line.sku, line.item_id
                )));
            }
        }

        for line in &lines {
            sqlx::query(
                "UPDATE items SET stock_quantity = stock_quantity - $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(line.amount)
            .bind(line.item_id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;
        }

        let siblings = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM users
            WHERE user_email_id IN (SELECT user_email_id FROM users WHERE id = $1)
            ",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        let discount = i32::from(loyalty_discount(siblings));

        let status_id = sqlx::query_scalar::<_, OrderStatusId>(
            "SELECT id FROM order_statuses WHERE status = $1",
        )
        .bind(OrderStatus::InProcess.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::from)?
        .ok_or(RepositoryError::NotFound)?;

        let order_id = sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO orders (user_id, order_status_id, discount)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(status_id)
        .bind(discount)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        for line in &lines {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, item_id, amount, unit_price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order_id)
            .bind(line.item_id)
            .bind(line.amount)
            .bind(line.price)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(order_id)
    }

    /// Move an order to another status.
    ///
    /// `IN PROCESS` orders may move to `COMPLETE` or `CANCELLED`; both are
    /// terminal. Re-asserting `IN PROCESS` on an `IN PROCESS` order is a
    /// no-op success.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` if the order is unknown,
    /// `OrderError::InvalidStatus` for an unrecognized status name, and
    /// `OrderError::AlreadyFinal` once the order reached a terminal status.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status_name: &str,
    ) -> Result<OrderStatus, OrderError> {
        let next: OrderStatus = status_name
            .parse()
            .map_err(|_| OrderError::InvalidStatus(status_name.to_owned()))?;

        let head = self
            .orders
            .find(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        let current: OrderStatus = head.status.parse().map_err(|_| {
            OrderError::Repository(RepositoryError::DataCorruption(format!(
                "unknown order status in database: {}",
                head.status
            )))
        })?;

        if current.is_terminal() {
            return Err(OrderError::AlreadyFinal(current));
        }

        let status_id = self.orders.status_id(next).await?;
        self.orders.set_status(order_id, status_id).await?;

        Ok(next)
    }

    /// List one user's orders with nested lines and computed totals.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn get_user_orders(&self, user_id: UserId) -> Result<Vec<OrderView>, OrderError> {
        let rows = self.orders.lines_for_user(user_id).await?;
        Ok(group_orders(rows, false))
    }

    /// List every order, purchaser included (admin listing).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn get_all_orders(&self) -> Result<Vec<OrderView>, OrderError> {
        let rows = self.orders.lines_for_all().await?;
        Ok(group_orders(rows, true))
    }
}
