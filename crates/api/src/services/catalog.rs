//! Catalog service: categories and items.

use sqlx::PgPool;

use pomelo_core::{CategoryId, ItemId};

use crate::db::{CategoryRepository, ItemRepository, RepositoryError};
use crate::models::catalog::{Category, ItemChanges, ItemView, NewItem};

/// Errors that can occur during catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Category id is unknown.
    #[error("Category does not exist")]
    CategoryNotFound,

    /// Category name is taken.
    #[error("Category already exists in database")]
    CategoryExists,

    /// A category was renamed to the name it already has. Not an error,
    /// not quite a success either.
    #[error(
        "An error did not occur when changing the existing category name to the existing category name"
    )]
    UnchangedName,

    /// Category still has items referencing it.
    #[error("Category is referenced by existing items and can not be deleted")]
    CategoryInUse,

    /// Item id is unknown.
    #[error("Could not find item with provided item ID")]
    ItemNotFound,

    /// SKU is taken by another item.
    #[error("Item with the same sku exists in database")]
    SkuExists,

    /// The referenced category id does not exist.
    #[error("Provided category ID does not exist")]
    UnknownCategory,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Outcome of creating an item: the new id, plus a non-fatal warning when
/// another item already carries the same name.
#[derive(Debug)]
pub struct CreatedItem {
    pub id: ItemId,
    pub name_taken: bool,
}

/// Catalog service.
pub struct CatalogService<'a> {
    categories: CategoryRepository<'a>,
    items: ItemRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            categories: CategoryRepository::new(pool),
            items: ItemRepository::new(pool),
        }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        Ok(self.categories.list().await?)
    }

    /// Create a category. The name is stored capitalized.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CategoryExists` if the name is taken.
    pub async fn create_category(&self, name: &str) -> Result<Category, CatalogError> {
        let name = capitalize(name);
        self.categories.create(&name).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => CatalogError::CategoryExists,
            other => CatalogError::Repository(other),
        })
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CategoryNotFound` if the id is unknown.
    /// Returns `CatalogError::UnchangedName` if the new name equals the
    /// current one. Returns `CatalogError::CategoryExists` if another
    /// category holds the name.
    pub async fn update_category(&self, id: CategoryId, name: &str) -> Result<(), CatalogError> {
        let name = capitalize(name);

        let current = self
            .categories
            .find(id)
            .await?
            .ok_or(CatalogError::CategoryNotFound)?;

        if current.name == name {
            return Err(CatalogError::UnchangedName);
        }

        self.categories.rename(id, &name).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => CatalogError::CategoryExists,
            RepositoryError::NotFound => CatalogError::CategoryNotFound,
            other => CatalogError::Repository(other),
        })
    }

    /// Delete a category with no items referencing it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::CategoryNotFound` if the id is unknown.
    /// Returns `CatalogError::CategoryInUse` if items still reference it.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), CatalogError> {
        let deleted = self.categories.delete(id).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => CatalogError::CategoryInUse,
            other => CatalogError::Repository(other),
        })?;

        if deleted {
            Ok(())
        } else {
            Err(CatalogError::CategoryNotFound)
        }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// List all items with their categories.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list_items(&self) -> Result<Vec<ItemView>, CatalogError> {
        let rows = self.items.list_with_category().await?;
        Ok(rows.into_iter().map(|r| r.into_view()).collect())
    }

    /// Create an item.
    ///
    /// Duplicate names are allowed but reported back as a non-fatal warning;
    /// duplicate SKUs are not.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::SkuExists` if the SKU is taken.
    /// Returns `CatalogError::UnknownCategory` if the category id does not
    /// exist.
    pub async fn create_item(&self, item: NewItem) -> Result<CreatedItem, CatalogError> {
        if self.items.sku_taken(&item.sku, None).await? {
            return Err(CatalogError::SkuExists);
        }

        if self.categories.find(item.category_id).await?.is_none() {
            return Err(CatalogError::UnknownCategory);
        }

        let name_taken = self.items.name_taken(&item.item_name).await?;

        let id = self.items.create(&item).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => CatalogError::SkuExists,
            other => CatalogError::Repository(other),
        })?;

        Ok(CreatedItem { id, name_taken })
    }

    /// Apply a partial update to an item.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ItemNotFound` if the id is unknown.
    /// Returns `CatalogError::SkuExists` if a new SKU collides with a
    /// different item.
    pub async fn update_item(&self, id: ItemId, changes: ItemChanges) -> Result<(), CatalogError> {
        if self.items.find(id).await?.is_none() {
            return Err(CatalogError::ItemNotFound);
        }

        if let Some(sku) = &changes.sku
            && self.items.sku_taken(sku, Some(id)).await?
        {
            return Err(CatalogError::SkuExists);
        }

        if let Some(category_id) = changes.category_id
            && self.categories.find(category_id).await?.is_none()
        {
            return Err(CatalogError::UnknownCategory);
        }

        if changes.is_empty() {
            return Ok(());
        }

        self.items.update(id, &changes).await.map_err(|e| match e {
            RepositoryError::NotFound => CatalogError::ItemNotFound,
            RepositoryError::Conflict(_) => CatalogError::SkuExists,
            other => CatalogError::Repository(other),
        })
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ItemNotFound` if the id is unknown.
    pub async fn delete_item(&self, id: ItemId) -> Result<(), CatalogError> {
        if self.items.delete(id).await? {
            Ok(())
        } else {
            Err(CatalogError::ItemNotFound)
        }
    }
}

/// Capitalize a name: first letter upper, the rest lower.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("laptops"), "Laptops");
        assert_eq!(capitalize("LAPTOPS"), "Laptops");
        assert_eq!(capitalize("gaming chairs"), "Gaming chairs");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("x"), "X");
    }
}
