//! Tagged discovery request, resolved once at the HTTP boundary

use crate::domain::semantic::ImagePayload;

/// The three request shapes the discovery endpoint accepts
#[derive(Debug, Clone)]
pub enum DiscoveryRequest {
    /// Free-text query, searched lexically and semantically
    TextSearch {
        query: String,
        user_id: Option<String>,
    },
    /// First phase of image search: rank and park results under a token
    ImageSearchSubmit {
        payload: ImagePayload,
        user_id: Option<String>,
    },
    /// Second phase of image search: materialize a parked result set
    TokenLookup {
        token: String,
        user_id: Option<String>,
    },
}

impl DiscoveryRequest {
    pub fn text(query: impl Into<String>, user_id: Option<String>) -> Self {
        Self::TextSearch {
            query: query.into(),
            user_id,
        }
    }

    pub fn token(token: impl Into<String>, user_id: Option<String>) -> Self {
        Self::TokenLookup {
            token: token.into(),
            user_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::TextSearch { .. } => "text_search",
            Self::ImageSearchSubmit { .. } => "image_search_submit",
            Self::TokenLookup { .. } => "token_lookup",
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::TextSearch { user_id, .. }
            | Self::ImageSearchSubmit { user_id, .. }
            | Self::TokenLookup { user_id, .. } => user_id.as_deref(),
        }
    }
}
