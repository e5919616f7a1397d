//! Lexical search over store and product text fields

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::DomainError;
use crate::domain::catalog::{CatalogRepository, ProductSummary, StoreSummary};

/// Result bounds for lexical search
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LexicalSearchConfig {
    /// Stores returned alongside every text search
    pub store_limit: usize,
    /// Products returned by the lexical fallback
    pub product_limit: usize,
}

impl Default for LexicalSearchConfig {
    fn default() -> Self {
        Self {
            store_limit: 20,
            product_limit: 50,
        }
    }
}

/// Case-insensitive substring search backed by the catalog store.
///
/// Always used for stores; used for products only when semantic ranking
/// produced nothing.
#[derive(Clone)]
pub struct LexicalSearchEngine {
    catalog: Arc<dyn CatalogRepository>,
    config: LexicalSearchConfig,
}

impl LexicalSearchEngine {
    pub fn new(catalog: Arc<dyn CatalogRepository>, config: LexicalSearchConfig) -> Self {
        Self { catalog, config }
    }

    #[instrument(skip(self))]
    pub async fn search_stores(&self, query: &str) -> Result<Vec<StoreSummary>, DomainError> {
        let query = query.trim();

        if query.is_empty() {
            return Ok(Vec::new());
        }

        let stores = self
            .catalog
            .search_stores(query, self.config.store_limit)
            .await?;

        debug!(count = stores.len(), "Lexical store search complete");
        Ok(stores)
    }

    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<ProductSummary>, DomainError> {
        let query = query.trim();

        if query.is_empty() {
            return Ok(Vec::new());
        }

        let products = self
            .catalog
            .search_products(query, self.config.product_limit)
            .await?;

        debug!(count = products.len(), "Lexical product search complete");
        Ok(products)
    }
}
