//! Ranked result set parked under an image-search token

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::semantic::RankedMatch;

/// Lifetime of a parked result set. Clients rely on this value.
pub const RESULT_TOKEN_TTL: Duration = Duration::from_secs(300);

/// Candidate ids with aligned scores: `scores[i]` belongs to `product_ids[i]`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResult {
    pub token: String,
    pub product_ids: Vec<String>,
    pub scores: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

/// Wire shape as read back from the cache, before the alignment check
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredResult {
    token: Option<String>,
    product_ids: Option<Vec<String>>,
    scores: Option<Vec<f32>>,
    created_at: Option<DateTime<Utc>>,
}

impl CachedResult {
    /// Builds an entry from ranked matches, keeping their order
    pub fn from_matches(token: impl Into<String>, matches: &[RankedMatch]) -> Self {
        let (product_ids, scores) = matches
            .iter()
            .map(|m| (m.product_id.clone(), m.score))
            .unzip();

        Self {
            token: token.into(),
            product_ids,
            scores,
            created_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.product_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty()
    }

    /// Parses a cached payload, rejecting entries whose arrays are missing
    /// or not aligned
    pub fn parse(token: &str, raw: &str) -> Result<Self, DomainError> {
        let stored: StoredResult = serde_json::from_str(raw).map_err(|e| {
            DomainError::malformed_cache_entry(format!("Unreadable payload for token: {}", e))
        })?;

        let product_ids = stored
            .product_ids
            .ok_or_else(|| DomainError::malformed_cache_entry("productIds missing"))?;
        let scores = stored
            .scores
            .ok_or_else(|| DomainError::malformed_cache_entry("scores missing"))?;

        if product_ids.len() != scores.len() {
            return Err(DomainError::malformed_cache_entry(format!(
                "{} product ids but {} scores",
                product_ids.len(),
                scores.len()
            )));
        }

        Ok(Self {
            token: stored.token.unwrap_or_else(|| token.to_string()),
            product_ids,
            scores,
            created_at: stored.created_at.unwrap_or_else(Utc::now),
        })
    }
}
