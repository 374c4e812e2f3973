//! Category and item repositories.

use sqlx::PgPool;

use pomelo_core::{CategoryId, ItemId};

use super::RepositoryError;
use crate::models::catalog::{Category, Item, ItemChanges, ItemWithCategory, NewItem};

/// Shared SELECT for an item joined with its category.
const ITEM_WITH_CATEGORY: &str = r"
    SELECT i.id, i.item_name, i.image_url, i.sku, i.price, i.stock_quantity,
           i.category_id, c.name AS category_name
    FROM items i
    JOIN categories c ON c.id = i.category_id
";

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Get a category by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Get a category by exact name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Create a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, name: &str) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(unique_to_conflict("category name already exists"))?;

        Ok(row)
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn rename(&self, id: CategoryId, name: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE categories SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(self.pool)
            .await
            .map_err(unique_to_conflict("category name already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a category.
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was removed, `false` if the id was unknown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if items still reference the
    /// category (the schema declares `ON DELETE RESTRICT`).
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "category is referenced by existing items".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}

/// Repository for item database operations.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all items joined with their categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_category(&self) -> Result<Vec<ItemWithCategory>, RepositoryError> {
        let query = format!("{ITEM_WITH_CATEGORY} ORDER BY i.id");
        let rows = sqlx::query_as::<_, ItemWithCategory>(&query)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Get an item by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let row = sqlx::query_as::<_, Item>(
            r"
            SELECT id, item_name, image_url, sku, price, stock_quantity, category_id
            FROM items
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Whether a SKU is taken, optionally ignoring one item (for updates).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sku_taken(
        &self,
        sku: &str,
        exclude: Option<ItemId>,
    ) -> Result<bool, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM items WHERE sku = $1 AND id IS DISTINCT FROM $2",
        )
        .bind(sku)
        .bind(exclude)
        .fetch_one(self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Whether an item with this name exists (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_taken(&self, name: &str) -> Result<bool, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM items WHERE LOWER(item_name) = LOWER($1)",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Create a new item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, item: &NewItem) -> Result<ItemId, RepositoryError> {
        let id = sqlx::query_scalar::<_, ItemId>(
            r"
            INSERT INTO items (item_name, image_url, sku, price, stock_quantity, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&item.item_name)
        .bind(&item.image_url)
        .bind(&item.sku)
        .bind(item.price)
        .bind(item.stock_quantity)
        .bind(item.category_id)
        .fetch_one(self.pool)
        .await
        .map_err(unique_to_conflict("sku already exists"))?;

        Ok(id)
    }

    /// Apply a partial update; absent fields keep their current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    /// Returns `RepositoryError::Conflict` if a new SKU collides.
    pub async fn update(&self, id: ItemId, changes: &ItemChanges) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE items SET
                item_name      = COALESCE($2, item_name),
                image_url      = COALESCE($3, image_url),
                sku            = COALESCE($4, sku),
                price          = COALESCE($5, price),
                stock_quantity = COALESCE($6, stock_quantity),
                category_id    = COALESCE($7, category_id),
                updated_at     = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&changes.item_name)
        .bind(&changes.image_url)
        .bind(&changes.sku)
        .bind(changes.price)
        .bind(changes.stock_quantity)
        .bind(changes.category_id)
        .execute(self.pool)
        .await
        .map_err(unique_to_conflict("sku already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete an item.
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was removed, `false` if the id was unknown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Insert an item under an id assigned by the external seed source.
    ///
    /// # Returns
    ///
    /// Returns `true` if the row was inserted, `false` if that id already
    /// existed locally (the import skips it).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_seeded(
        &self,
        id: ItemId,
        item: &NewItem,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO items (id, item_name, image_url, sku, price, stock_quantity, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(id)
        .bind(&item.item_name)
        .bind(&item.image_url)
        .bind(&item.sku)
        .bind(item.price)
        .bind(item.stock_quantity)
        .bind(item.category_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Realign the id sequence after seeding rows with explicit ids.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sync_id_sequence(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            SELECT setval(
                pg_get_serial_sequence('items', 'id'),
                (SELECT COALESCE(MAX(id), 1) FROM items)
            )
            ",
        )
        .execute(self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Find one item by exact SKU.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_sku(&self, sku: &str) -> Result<Option<ItemWithCategory>, RepositoryError> {
        let query = format!("{ITEM_WITH_CATEGORY} WHERE i.sku = $1");
        let row = sqlx::query_as::<_, ItemWithCategory>(&query)
            .bind(sku)
            .fetch_optional(self.pool)
            .await?;

        Ok(row)
    }

    /// Find items whose name contains the fragment (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_by_name(
        &self,
        fragment: &str,
    ) -> Result<Vec<ItemWithCategory>, RepositoryError> {
        let query =
            format!("{ITEM_WITH_CATEGORY} WHERE i.item_name ILIKE '%' || $1 || '%' ORDER BY i.id");
        let rows = sqlx::query_as::<_, ItemWithCategory>(&query)
            .bind(fragment)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Find items in a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<ItemWithCategory>, RepositoryError> {
        let query = format!("{ITEM_WITH_CATEGORY} WHERE i.category_id = $1 ORDER BY i.id");
        let rows = sqlx::query_as::<_, ItemWithCategory>(&query)
            .bind(category_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }

    /// Find items in a category whose name contains the fragment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_by_name_and_category(
        &self,
        fragment: &str,
        category_id: CategoryId,
    ) -> Result<Vec<ItemWithCategory>, RepositoryError> {
        let query = format!(
            "{ITEM_WITH_CATEGORY} WHERE i.item_name ILIKE '%' || $1 || '%' AND i.category_id = $2 ORDER BY i.id"
        );
        let rows = sqlx::query_as::<_, ItemWithCategory>(&query)
            .bind(fragment)
            .bind(category_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows)
    }
}

/// Map a unique violation to `Conflict`, passing other errors through.
fn unique_to_conflict(message: &'static str) -> impl Fn(sqlx::Error) -> RepositoryError {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict(message.to_owned());
        }
        RepositoryError::Database(e)
    }
}
