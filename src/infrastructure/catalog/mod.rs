//! Catalog infrastructure - Storage adapters for stores, products and wishlists

mod in_memory;
mod postgres;

pub use in_memory::{InMemoryCatalogRepository, InMemoryWishlistRepository};
pub use postgres::{
    connect_pool, DatabaseConfig, PostgresCatalogRepository, PostgresWishlistRepository,
};
