//! Catalog and wishlist repository traits

use std::collections::HashSet;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::entity::{ProductSummary, StoreSummary};
use crate::domain::DomainError;

/// Read access to stores and products
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Case-insensitive substring match on store name and description
    async fn search_stores(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<StoreSummary>, DomainError>;

    /// Case-insensitive substring match on product name and description,
    /// in the storage layer's natural order
    async fn search_products(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ProductSummary>, DomainError>;

    /// Fetches products by id; missing ids are absent from the result and
    /// the returned order is unspecified
    async fn find_products(&self, ids: &[String]) -> Result<Vec<ProductSummary>, DomainError>;

    /// Verifies the backing store is reachable
    async fn health_check(&self) -> Result<(), DomainError>;
}

/// Wishlist membership lookup
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    /// Returns the subset of `product_ids` saved by the user
    async fn wishlisted(
        &self,
        user_id: &str,
        product_ids: &[String],
    ) -> Result<HashSet<String>, DomainError>;
}
