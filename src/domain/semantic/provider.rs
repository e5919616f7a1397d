//! Semantic search provider trait

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use super::image::ImagePayload;
use crate::domain::DomainError;

/// A product identifier with its similarity score
///
/// Matches arrive in no guaranteed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub product_id: String,
    pub score: f32,
}

impl RankedMatch {
    pub fn new(product_id: impl Into<String>, score: f32) -> Self {
        Self {
            product_id: product_id.into(),
            score,
        }
    }
}

/// External semantic/visual similarity ranking
///
/// Implementations must apply a bounded timeout and must drop matches that
/// carry no usable product identifier. A timeout or non-success response
/// is reported as `DomainError::Provider`; whether that is fatal is the
/// caller's decision.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SemanticSearchProvider: Send + Sync {
    /// Ranks products against a free-text query
    async fn rank_by_text(&self, query: &str, top_k: usize)
    -> Result<Vec<RankedMatch>, DomainError>;

    /// Ranks products by visual similarity to an uploaded image
    async fn rank_by_image(&self, payload: &ImagePayload) -> Result<Vec<RankedMatch>, DomainError>;

    /// Provider name used in logs and metrics
    fn provider_name(&self) -> &'static str;
}
