//! Results of the three discovery operations

use serde::Serialize;

use super::merge::MergedProduct;
use crate::domain::catalog::StoreSummary;

/// Which backend produced the product ranking of a text search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    /// Semantic backend returned at least one usable id
    Ai,
    /// Semantic backend returned nothing or was unavailable
    Fallback,
}

impl SearchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for SearchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TextSearchResult {
    pub stores: Vec<StoreSummary>,
    pub products: Vec<MergedProduct>,
    pub source: SearchSource,
}

impl TextSearchResult {
    pub fn count(&self) -> usize {
        self.products.len()
    }
}

/// First phase of image search
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSubmission {
    /// Results parked; the token is valid for the result TTL
    Issued { token: String },
    /// The ranking service found nothing; no token was issued
    NoMatches,
}

/// Second phase of image search
#[derive(Debug, Clone)]
pub enum TokenLookup {
    Found { products: Vec<MergedProduct> },
    /// Expired or never issued; the two are indistinguishable
    NotFound,
}
