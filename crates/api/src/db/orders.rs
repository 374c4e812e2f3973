//! Order repository.
//!
//! Only pool-scoped reads and status writes live here; the checkout
//! transaction is owned by the order service, which needs to interleave
//! validation with the locked reads.

use sqlx::PgPool;

use pomelo_core::{OrderId, OrderStatus, OrderStatusId, UserId};

use super::RepositoryError;
use crate::models::order::{OrderHead, OrderLineDetail};

/// Shared SELECT for order lines joined with order, item, and category.
const ORDER_LINES: &str = r"
    SELECT o.id AS order_id, o.created_at AS order_created_at, s.status, o.discount,
           o.user_id, u.first_name || ' ' || u.last_name AS user_name,
           oi.id AS line_id, oi.amount, oi.unit_price,
           i.id AS item_id, i.item_name, i.sku, i.image_url,
           c.name AS category_name
    FROM orders o
    JOIN order_statuses s ON s.id = o.order_status_id
    JOIN users u ON u.id = o.user_id
    JOIN order_items oi ON oi.order_id = o.id
    JOIN items i ON i.id = oi.item_id
    JOIN categories c ON c.id = i.category_id
";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Ensure an order-status row exists.
    ///
    /// # Returns
    ///
    /// Returns `true` if the row was created, `false` if it already existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure_status(&self, status: OrderStatus) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO order_statuses (status) VALUES ($1) ON CONFLICT (status) DO NOTHING",
        )
        .bind(status.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get the id of an order status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the status has not been
    /// bootstrapped yet.
    pub async fn status_id(&self, status: OrderStatus) -> Result<OrderStatusId, RepositoryError> {
        let id = sqlx::query_scalar::<_, OrderStatusId>(
            "SELECT id FROM order_statuses WHERE status = $1",
        )
        .bind(status.as_str())
        .fetch_optional(self.pool)
        .await?;

        id.ok_or(RepositoryError::NotFound)
    }

    /// Get an order with its status name resolved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, id: OrderId) -> Result<Option<OrderHead>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderHead>(
            r"
            SELECT o.id, o.user_id, s.status, o.discount
            FROM orders o
            JOIN order_statuses s ON s.id = o.order_status_id
            WHERE o.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Move an order to another status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_status(
        &self,
        id: OrderId,
        status_id: OrderStatusId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET order_status_id = $2 WHERE id = $1")
            .bind(id)
            .bind(status_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List one user's order lines, ready for regrouping.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderLineDetail>, RepositoryError> {
        let query = format!("{ORDER_LINES} WHERE o.user_id = $1 ORDER BY o.id DESC, oi.id");
        let rows = sqlx::query_as::<_, OrderLineDetail>(&query)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// List every order's lines, ready for regrouping.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_for_all(&self) -> Result<Vec<OrderLineDetail>, RepositoryError> {
        let query = format!("{ORDER_LINES} ORDER BY o.id DESC, oi.id");
        let rows = sqlx::query_as::<_, OrderLineDetail>(&query)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }
}
