//! Marketplace product discovery
//!
//! Text and image search over a marketplace catalog:
//! - Lexical store and product search with semantic ranking and lexical fallback
//! - Two-phase image search through short-lived result tokens
//! - Score-ordered merging and per-user wishlist flags

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use api::state::AppState;
use domain::catalog::{CatalogRepository, WishlistRepository};
use domain::DomainError;
use infrastructure::cache::CacheFactory;
use infrastructure::catalog::{
    connect_pool, InMemoryCatalogRepository, InMemoryWishlistRepository,
    PostgresCatalogRepository, PostgresWishlistRepository,
};
use infrastructure::discovery::ResultCache;
use infrastructure::semantic::{HttpClient, HttpSemanticSearchClient};
use infrastructure::services::{
    DiscoveryService, LexicalSearchEngine, PersonalizationEnricher,
};

/// Application state plus the resources the process must release on shutdown
pub struct AppContext {
    pub state: AppState,
    pub pool: Option<PgPool>,
}

/// Builds every dependency from configuration and wires the discovery service
pub async fn create_app_state(config: &AppConfig) -> Result<AppContext, DomainError> {
    let (catalog, wishlist, pool) = match &config.database.url {
        Some(_) => {
            let pool = connect_pool(&config.database).await?;
            info!("Connected to PostgreSQL catalog");

            let catalog: Arc<dyn CatalogRepository> =
                Arc::new(PostgresCatalogRepository::new(pool.clone()));
            let wishlist: Arc<dyn WishlistRepository> =
                Arc::new(PostgresWishlistRepository::new(pool.clone()));
            (catalog, wishlist, Some(pool))
        }
        None => {
            warn!("No database URL configured, using an empty in-memory catalog");

            let catalog: Arc<dyn CatalogRepository> = Arc::new(InMemoryCatalogRepository::new());
            let wishlist: Arc<dyn WishlistRepository> =
                Arc::new(InMemoryWishlistRepository::new());
            (catalog, wishlist, None)
        }
    };

    let cache = CacheFactory::new().create(&config.cache).await?;
    info!(cache_type = %config.cache.cache_type, "Result cache ready");

    let http_client = HttpClient::with_timeout(config.semantic.timeout())?;
    let semantic = Arc::new(HttpSemanticSearchClient::new(http_client, &config.semantic));

    let service = DiscoveryService::new(
        LexicalSearchEngine::new(catalog.clone(), config.search.clone()),
        catalog,
        semantic,
        ResultCache::new(cache),
        PersonalizationEnricher::new(wishlist),
    )
    .with_top_k(config.semantic.top_k);

    Ok(AppContext {
        state: AppState::new(Arc::new(service)),
        pool,
    })
}
