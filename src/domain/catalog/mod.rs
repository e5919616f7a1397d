//! Catalog domain - Read-only product and store projections

mod entity;
mod repository;

pub use entity::{ProductSummary, StoreRef, StoreSummary};
pub use repository::{CatalogRepository, WishlistRepository};

#[cfg(test)]
pub use repository::{MockCatalogRepository, MockWishlistRepository};
