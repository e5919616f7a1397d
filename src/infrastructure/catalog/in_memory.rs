//! In-memory catalog and wishlist repositories
//!
//! Used when no database URL is configured and in tests. Matching follows the
//! PostgreSQL adapter: case-insensitive substring on name or description,
//! results in insertion order.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::catalog::{
    CatalogRepository, ProductSummary, StoreSummary, WishlistRepository,
};
use crate::domain::DomainError;

fn lock_poisoned<T>(_: T) -> DomainError {
    DomainError::internal("In-memory catalog lock poisoned")
}

fn matches_query(query: &str, name: &str, description: Option<&str>) -> bool {
    let query = query.to_lowercase();

    name.to_lowercase().contains(&query)
        || description.is_some_and(|d| d.to_lowercase().contains(&query))
}

/// Thread-safe in-memory catalog
#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    stores: RwLock<Vec<StoreSummary>>,
    products: RwLock<Vec<ProductSummary>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-populated with stores and products
    pub fn with_catalog(stores: Vec<StoreSummary>, products: Vec<ProductSummary>) -> Self {
        Self {
            stores: RwLock::new(stores),
            products: RwLock::new(products),
        }
    }

    pub fn add_store(&self, store: StoreSummary) -> Result<(), DomainError> {
        self.stores.write().map_err(lock_poisoned)?.push(store);
        Ok(())
    }

    /// Inserts or replaces a product by id
    pub fn upsert_product(&self, product: ProductSummary) -> Result<(), DomainError> {
        let mut products = self.products.write().map_err(lock_poisoned)?;

        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }

        Ok(())
    }

    pub fn remove_product(&self, id: &str) -> Result<bool, DomainError> {
        let mut products = self.products.write().map_err(lock_poisoned)?;
        let before = products.len();
        products.retain(|p| p.id != id);

        Ok(products.len() != before)
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn search_stores(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<StoreSummary>, DomainError> {
        let stores = self.stores.read().map_err(lock_poisoned)?;

        Ok(stores
            .iter()
            .filter(|s| matches_query(query, &s.name, s.description.as_deref()))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_products(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ProductSummary>, DomainError> {
        let products = self.products.read().map_err(lock_poisoned)?;

        Ok(products
            .iter()
            .filter(|p| matches_query(query, &p.name, Some(&p.description)))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_products(&self, ids: &[String]) -> Result<Vec<ProductSummary>, DomainError> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let products = self.products.read().map_err(lock_poisoned)?;

        Ok(products
            .iter()
            .filter(|p| wanted.contains(p.id.as_str()))
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Thread-safe in-memory wishlist, keyed by user id
#[derive(Debug, Default)]
pub struct InMemoryWishlistRepository {
    items: RwLock<HashMap<String, HashSet<String>>>,
}

impl InMemoryWishlistRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, user_id: impl Into<String>, product_id: impl Into<String>) -> Result<(), DomainError> {
        self.items
            .write()
            .map_err(lock_poisoned)?
            .entry(user_id.into())
            .or_default()
            .insert(product_id.into());

        Ok(())
    }
}

#[async_trait]
impl WishlistRepository for InMemoryWishlistRepository {
    async fn wishlisted(
        &self,
        user_id: &str,
        product_ids: &[String],
    ) -> Result<HashSet<String>, DomainError> {
        let items = self.items.read().map_err(lock_poisoned)?;

        let Some(saved) = items.get(user_id) else {
            return Ok(HashSet::new());
        };

        Ok(product_ids
            .iter()
            .filter(|id| saved.contains(id.as_str()))
            .cloned()
            .collect())
    }
}
