//! PostgreSQL catalog and wishlist repositories with connection pooling
//!
//! The schema is owned by the marketplace storage layer:
//! `stores`, `products`, `product_variants` and `wishlist_items`.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::debug;

use crate::domain::catalog::{
    CatalogRepository, ProductSummary, StoreRef, StoreSummary, WishlistRepository,
};
use crate::domain::DomainError;

/// Database connection settings; no URL means the in-memory catalog is used
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

/// Opens the shared connection pool
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| DomainError::configuration("Database URL is not configured"))?;

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
}

/// Escapes LIKE metacharacters so the query is matched literally
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');

    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped.push('%');
    escaped
}

const PRODUCT_COLUMNS: &str = r#"
    p.id::text AS id,
    p.name,
    COALESCE(p.description, '') AS description,
    COALESCE(p.category, '') AS category,
    p.price::float8 AS price,
    s.id::text AS store_id,
    s.name AS store_name,
    (
        SELECT v.image_url
        FROM product_variants v
        WHERE v.product_id = p.id AND v.image_url IS NOT NULL
        ORDER BY v.position, v.id
        LIMIT 1
    ) AS preview_image
"#;

fn product_from_row(row: &PgRow) -> Result<ProductSummary, sqlx::Error> {
    Ok(ProductSummary {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        price: row.try_get("price")?,
        store: StoreRef {
            id: row.try_get("store_id")?,
            name: row.try_get("store_name")?,
        },
        preview_image: row.try_get("preview_image")?,
    })
}

/// PostgreSQL-backed [`CatalogRepository`]
#[derive(Debug, Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn search_stores(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<StoreSummary>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id::text AS id, name, description, logo_url
            FROM stores
            WHERE name ILIKE $1 ESCAPE '\' OR description ILIKE $1 ESCAPE '\'
            ORDER BY name
            LIMIT $2
            "#,
        )
        .bind(like_pattern(query))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to search stores: {}", e)))?;

        rows.iter()
            .map(|row| {
                Ok(StoreSummary {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                    logo_url: row.try_get("logo_url")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| DomainError::storage(format!("Failed to read store row: {}", e)))
    }

    async fn search_products(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ProductSummary>, DomainError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM products p
            JOIN stores s ON s.id = p.store_id
            WHERE p.name ILIKE $1 ESCAPE '\' OR p.description ILIKE $1 ESCAPE '\'
            LIMIT $2
            "#,
            PRODUCT_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(like_pattern(query))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to search products: {}", e)))?;

        rows.iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::storage(format!("Failed to read product row: {}", e)))
    }

    async fn find_products(&self, ids: &[String]) -> Result<Vec<ProductSummary>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT {}
            FROM products p
            JOIN stores s ON s.id = p.store_id
            WHERE p.id::text = ANY($1)
            "#,
            PRODUCT_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to fetch products: {}", e)))?;

        debug!(requested = ids.len(), found = rows.len(), "Fetched products by id");

        rows.iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::storage(format!("Failed to read product row: {}", e)))
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database ping failed: {}", e)))?;

        Ok(())
    }
}

/// PostgreSQL-backed [`WishlistRepository`]
#[derive(Debug, Clone)]
pub struct PostgresWishlistRepository {
    pool: PgPool,
}

impl PostgresWishlistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WishlistRepository for PostgresWishlistRepository {
    async fn wishlisted(
        &self,
        user_id: &str,
        product_ids: &[String],
    ) -> Result<HashSet<String>, DomainError> {
        if product_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT DISTINCT product_id::text AS product_id
            FROM wishlist_items
            WHERE user_id::text = $1 AND product_id::text = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to read wishlist: {}", e)))?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("product_id"))
            .collect::<Result<HashSet<_>, _>>()
            .map_err(|e| DomainError::storage(format!("Failed to read wishlist row: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();

        assert!(config.url.is_none());
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout_secs, 30);
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("shoe"), "%shoe%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[tokio::test]
    async fn test_connect_pool_requires_url() {
        let err = connect_pool(&DatabaseConfig::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
