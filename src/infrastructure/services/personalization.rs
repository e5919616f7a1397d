//! Per-user decoration of search results

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::DomainError;
use crate::domain::catalog::WishlistRepository;
use crate::domain::discovery::MergedProduct;

/// Sets `is_wishlisted` on each product without touching order
#[derive(Clone)]
pub struct PersonalizationEnricher {
    wishlist: Arc<dyn WishlistRepository>,
}

impl PersonalizationEnricher {
    pub fn new(wishlist: Arc<dyn WishlistRepository>) -> Self {
        Self { wishlist }
    }

    /// Anonymous callers get `false` everywhere and cause no lookup; a known
    /// user costs exactly one membership query.
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn enrich(
        &self,
        mut products: Vec<MergedProduct>,
        user_id: Option<&str>,
    ) -> Result<Vec<MergedProduct>, DomainError> {
        let user_id = match user_id {
            Some(id) if !id.trim().is_empty() && !products.is_empty() => id,
            _ => {
                products.iter_mut().for_each(|p| p.is_wishlisted = false);
                return Ok(products);
            }
        };

        let ids: Vec<String> = products.iter().map(|p| p.id().to_string()).collect();
        let saved = self.wishlist.wishlisted(user_id, &ids).await?;

        for product in &mut products {
            product.is_wishlisted = saved.contains(product.id());
        }

        debug!(wishlisted = saved.len(), "Applied wishlist flags");
        Ok(products)
    }
}
