//! Discovery request and response bodies

use serde::{Deserialize, Serialize};

use crate::domain::catalog::StoreSummary;
use crate::domain::discovery::{
    ImageSubmission, MergedProduct, SearchSource, TextSearchResult, TokenLookup,
};

pub const NO_MATCHES_MESSAGE: &str = "No matching products found";
pub const TOKEN_EXPIRED_MESSAGE: &str = "Token expired or invalid";

/// `GET /api/search` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: Option<String>,
}

/// Token lookup body; a missing token is a validation error, not a parse error
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSearchResponse {
    pub status: bool,
    pub stores: Vec<StoreSummary>,
    pub products_with_wishlist_status: Vec<MergedProduct>,
    pub count: usize,
    pub source: SearchSource,
}

impl From<TextSearchResult> for TextSearchResponse {
    fn from(result: TextSearchResult) -> Self {
        Self {
            status: true,
            count: result.count(),
            stores: result.stores,
            products_with_wishlist_status: result.products,
            source: result.source,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSubmitResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<ImageSubmission> for ImageSubmitResponse {
    fn from(submission: ImageSubmission) -> Self {
        match submission {
            ImageSubmission::Issued { token } => Self {
                success: true,
                token: Some(token),
                message: None,
            },
            ImageSubmission::NoMatches => Self {
                success: false,
                token: None,
                message: Some(NO_MATCHES_MESSAGE.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TokenLookupResponse {
    #[serde(rename_all = "camelCase")]
    Found {
        status: bool,
        products_with_wishlist_status: Vec<MergedProduct>,
        count: usize,
    },
    /// Expired and unknown tokens alike; clients treat this as terminal
    Expired { success: bool, message: String },
}

impl From<TokenLookup> for TokenLookupResponse {
    fn from(lookup: TokenLookup) -> Self {
        match lookup {
            TokenLookup::Found { products } => Self::Found {
                status: true,
                count: products.len(),
                products_with_wishlist_status: products,
            },
            TokenLookup::NotFound => Self::Expired {
                success: false,
                message: TOKEN_EXPIRED_MESSAGE.to_string(),
            },
        }
    }
}
