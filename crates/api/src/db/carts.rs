//! Cart repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use pomelo_core::{CartId, CartItemId, ItemId, UserId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartLine, CartLineDetail};

/// Repository for cart and cart-line database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's cart, if one has been created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, Cart>(
            "SELECT id, user_id, created_at, updated_at FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Get a user's cart, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, Cart>(
            r"
            INSERT INTO carts (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW()
            RETURNING id, user_id, created_at, updated_at
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Get a cart only if it belongs to the given user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_for_user(
        &self,
        cart_id: CartId,
        user_id: UserId,
    ) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, Cart>(
            "SELECT id, user_id, created_at, updated_at FROM carts WHERE id = $1 AND user_id = $2",
        )
        .bind(cart_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// List a cart's lines joined with item and category details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_with_items(
        &self,
        cart_id: CartId,
    ) -> Result<Vec<CartLineDetail>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineDetail>(
            r"
            SELECT ci.id, ci.amount, ci.price,
                   i.id AS item_id, i.item_name, i.image_url, i.sku,
                   i.price AS item_price, i.stock_quantity,
                   i.category_id, c.name AS category_name
            FROM cart_items ci
            JOIN items i ON i.id = ci.item_id
            JOIN categories c ON c.id = i.category_id
            WHERE ci.cart_id = $1
            ORDER BY ci.id
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Whether the cart already holds a line for this item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line_exists(
        &self,
        cart_id: CartId,
        item_id: ItemId,
    ) -> Result<bool, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cart_items WHERE cart_id = $1 AND item_id = $2",
        )
        .bind(cart_id)
        .bind(item_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Insert a new cart line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the (cart, item) pair already
    /// has a line. Returns `RepositoryError::Database` for other errors.
    pub async fn insert_line(
        &self,
        cart_id: CartId,
        item_id: ItemId,
        amount: i32,
        price: Decimal,
    ) -> Result<CartItemId, RepositoryError> {
        let id = sqlx::query_scalar::<_, CartItemId>(
            r"
            INSERT INTO cart_items (cart_id, item_id, amount, price)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(cart_id)
        .bind(item_id)
        .bind(amount)
        .bind(price)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("item already in cart".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(id)
    }

    /// Get a cart line only if its cart belongs to the given user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_line_for_user(
        &self,
        line_id: CartItemId,
        user_id: UserId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLine>(
            r"
            SELECT ci.id, ci.cart_id, ci.item_id, ci.amount, ci.price
            FROM cart_items ci
            JOIN carts c ON c.id = ci.cart_id
            WHERE ci.id = $1 AND c.user_id = $2
            ",
        )
        .bind(line_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Set a line's amount and price snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    pub async fn update_line(
        &self,
        line_id: CartItemId,
        amount: i32,
        price: Decimal,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE cart_items SET amount = $2, price = $3 WHERE id = $1")
            .bind(line_id)
            .bind(amount)
            .bind(price)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete one cart line.
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_line(&self, line_id: CartItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(line_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every line in a cart; the cart row itself persists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
