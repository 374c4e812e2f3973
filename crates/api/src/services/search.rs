//! Catalog search.
//!
//! A search request names any of three criteria; exactly one lookup
//! strategy runs, chosen by precedence: SKU beats everything, then
//! name+category, then each alone.

use sqlx::PgPool;

use crate::db::{CategoryRepository, ItemRepository, RepositoryError};
use crate::models::catalog::ItemView;

/// Errors that can occur during catalog search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request named no criteria at all.
    #[error("No values provided, no values found")]
    NoCriteria,

    /// The chosen strategy matched nothing.
    #[error("No items found")]
    NoMatch,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A search request; empty strings count as absent.
#[derive(Debug, Default, Clone)]
pub struct SearchQuery {
    pub item_name: Option<String>,
    pub category_name: Option<String>,
    pub sku: Option<String>,
}

/// The lookup strategy a query resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Sku,
    NameAndCategory,
    NameOnly,
    CategoryOnly,
}

impl Strategy {
    /// Pick the single strategy for a query, if it names any criteria.
    fn select(query: &SearchQuery) -> Option<Self> {
        let has = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.is_empty());

        if has(&query.sku) {
            Some(Self::Sku)
        } else {
            match (has(&query.item_name), has(&query.category_name)) {
                (true, true) => Some(Self::NameAndCategory),
                (true, false) => Some(Self::NameOnly),
                (false, true) => Some(Self::CategoryOnly),
                (false, false) => None,
            }
        }
    }
}

/// Catalog search service.
pub struct SearchService<'a> {
    items: ItemRepository<'a>,
    categories: CategoryRepository<'a>,
}

impl<'a> SearchService<'a> {
    /// Create a new search service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            items: ItemRepository::new(pool),
            categories: CategoryRepository::new(pool),
        }
    }

    /// Run the search and return matching items with categories nested.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::NoCriteria` when no inputs were given and
    /// `SearchError::NoMatch` when the chosen strategy found nothing.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<ItemView>, SearchError> {
        let strategy = Strategy::select(query).ok_or(SearchError::NoCriteria)?;

        let rows = match strategy {
            Strategy::Sku => {
                let sku = query.sku.as_deref().unwrap_or_default();
                self.items.find_by_sku(sku).await?.into_iter().collect()
            }
            Strategy::NameOnly => {
                let name = query.item_name.as_deref().unwrap_or_default();
                self.items.search_by_name(name).await?
            }
            Strategy::CategoryOnly => {
                let category = self.find_category(query).await?;
                self.items.search_by_category(category).await?
            }
            Strategy::NameAndCategory => {
                let name = query.item_name.as_deref().unwrap_or_default();
                let category = self.find_category(query).await?;
                self.items
                    .search_by_name_and_category(name, category)
                    .await?
            }
        };

        if rows.is_empty() {
            return Err(SearchError::NoMatch);
        }

        Ok(rows.into_iter().map(|r| r.into_view()).collect())
    }

    async fn find_category(
        &self,
        query: &SearchQuery,
    ) -> Result<pomelo_core::CategoryId, SearchError> {
        let name = query.category_name.as_deref().unwrap_or_default();
        let category = self
            .categories
            .find_by_name(name)
            .await?
            .ok_or(SearchError::NoMatch)?;
        Ok(category.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(name: Option<&str>, category: Option<&str>, sku: Option<&str>) -> SearchQuery {
        SearchQuery {
            item_name: name.map(str::to_owned),
            category_name: category.map(str::to_owned),
            sku: sku.map(str::to_owned),
        }
    }

    #[test]
    fn test_sku_beats_everything() {
        let q = query(Some("pad"), Some("Laptops"), Some("LP100"));
        assert_eq!(Strategy::select(&q), Some(Strategy::Sku));
    }

    #[test]
    fn test_name_and_category() {
        let q = query(Some("pad"), Some("Laptops"), None);
        assert_eq!(Strategy::select(&q), Some(Strategy::NameAndCategory));
    }

    #[test]
    fn test_single_criteria() {
        assert_eq!(
            Strategy::select(&query(Some("pad"), None, None)),
            Some(Strategy::NameOnly)
        );
        assert_eq!(
            Strategy::select(&query(None, Some("Laptops"), None)),
            Some(Strategy::CategoryOnly)
        );
    }

    #[test]
    fn test_no_criteria() {
        assert_eq!(Strategy::select(&SearchQuery::default()), None);
        // Empty strings count as absent
        assert_eq!(Strategy::select(&query(Some(""), Some(""), Some(""))), None);
    }
}
