//! Cart service.
//!
//! One cart per user, created lazily on the first add. Lines snapshot
//! their price (`amount x item price`) at add/update time; stock is
//! validated here but only decremented at checkout.

use rust_decimal::Decimal;
use sqlx::PgPool;

use pomelo_core::{CartId, CartItemId, ItemId, UserId};

use crate::db::{CartRepository, ItemRepository, RepositoryError};
use crate::models::cart::CartView;

/// Errors that can occur during cart operations.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// The user has no cart yet, or the cart id is not theirs.
    #[error("No cart registered on user")]
    CartNotFound,

    /// Item id is unknown.
    #[error("Could not find item with provided item ID")]
    ItemNotFound,

    /// The cart line does not exist for this user.
    #[error("Cart item ID provided does not exist for registered user")]
    LineNotFound,

    /// The item already has a line in the cart; update it instead.
    #[error("Item already exists in cart. Use PUT request to update it")]
    AlreadyInCart,

    /// The item cannot cover the requested amount.
    #[error("{0}")]
    OutOfStock(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    items: ItemRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            items: ItemRepository::new(pool),
        }
    }

    /// Get the user's cart with nested lines, items, and categories.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` if no cart has been created yet.
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartView, CartError> {
        let cart = self
            .carts
            .find_by_user(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        let lines = self.carts.lines_with_items(cart.id).await?;
        Ok(CartView::assemble(cart, lines))
    }

    /// Add an item to the user's cart, creating the cart on first use.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the item id is unknown.
    /// Returns `CartError::OutOfStock` if the item has no stock or the
    /// requested amount exceeds it.
    /// Returns `CartError::AlreadyInCart` if the cart already holds a line
    /// for this item.
    pub async fn add_item(
        &self,
        user_id: UserId,
        item_id: ItemId,
        amount: Option<i32>,
    ) -> Result<(), CartError> {
        let item = self
            .items
            .find(item_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;

        if item.stock_quantity <= 0 {
            return Err(CartError::OutOfStock(format!(
                "Item is out of stock and can not be added to cart -- Sku: {}",
                item.sku
            )));
        }

        let cart = self.carts.find_or_create(user_id).await?;

        if self.carts.line_exists(cart.id, item_id).await? {
            return Err(CartError::AlreadyInCart);
        }

        let amount = amount.unwrap_or(1);
        if amount > item.stock_quantity {
            return Err(CartError::OutOfStock(format!(
                "Requested amount exceeds items in stock -- Sku: {}",
                item.sku
            )));
        }

        let price = Decimal::from(amount) * item.price;
        self.carts
            .insert_line(cart.id, item_id, amount, price)
            .await
            .map_err(|e| match e {
                // A concurrent add slipped past the check above.
                RepositoryError::Conflict(_) => CartError::AlreadyInCart,
                other => CartError::Repository(other),
            })?;

        Ok(())
    }

    /// Set a cart line to a new amount, recomputing its price snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the line does not exist or
    /// belongs to another user's cart.
    /// Returns `CartError::OutOfStock` if the new amount exceeds stock.
    pub async fn update_item(
        &self,
        user_id: UserId,
        line_id: CartItemId,
        new_amount: i32,
    ) -> Result<(), CartError> {
        let line = self
            .carts
            .find_line_for_user(line_id, user_id)
            .await?
            .ok_or(CartError::LineNotFound)?;

        let item = self
            .items
            .find(line.item_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;

        if new_amount > item.stock_quantity {
            return Err(CartError::OutOfStock(format!(
                "Requested amount exceeds items in stock, cart item can not be updated -- Sku: {}",
                item.sku
            )));
        }

        let price = Decimal::from(new_amount) * item.price;
        self.carts.update_line(line_id, new_amount, price).await?;

        Ok(())
    }

    /// Remove a single line from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if the line does not exist or
    /// belongs to another user's cart.
    pub async fn remove_item(&self, user_id: UserId, line_id: CartItemId) -> Result<(), CartError> {
        let line = self
            .carts
            .find_line_for_user(line_id, user_id)
            .await?
            .ok_or(CartError::LineNotFound)?;

        self.carts.delete_line(line.id).await?;
        Ok(())
    }

    /// Remove every line from a cart; the cart row itself persists.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` if the cart does not exist or
    /// belongs to another user.
    pub async fn clear_cart(&self, user_id: UserId, cart_id: CartId) -> Result<(), CartError> {
        let cart = self
            .carts
            .find_for_user(cart_id, user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        self.carts.clear(cart.id).await?;
        Ok(())
    }
}
