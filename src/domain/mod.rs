//! Domain layer - Core business logic and entities

pub mod cache;
pub mod catalog;
pub mod discovery;
pub mod error;
pub mod semantic;

pub use cache::{Cache, CacheExt};
pub use catalog::{CatalogRepository, ProductSummary, StoreRef, StoreSummary, WishlistRepository};
pub use discovery::{
    CachedResult, DiscoveryRequest, ImageSubmission, MergedProduct, RESULT_TOKEN_TTL,
    SearchSource, TextSearchResult, TokenLookup,
};
pub use error::DomainError;
pub use semantic::{ImageFormat, ImagePayload, RankedMatch, SemanticSearchProvider};
