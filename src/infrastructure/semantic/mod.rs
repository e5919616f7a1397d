//! Semantic search infrastructure - HTTP client for the external ranking service

mod client;
mod http_client;

pub use client::{HttpSemanticSearchClient, SemanticSearchConfig};
pub use http_client::{HttpClient, HttpClientTrait, MultipartUpload};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
