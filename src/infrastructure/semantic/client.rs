//! Semantic search client for the external ranking service
//!
//! Contract:
//! - `POST {base_url}/search/text` with `{"query": .., "top_k": ..}`
//! - `POST {base_url}/search/image` as multipart, file field `image`
//!
//! Both answer `{"results": [{"product_id": .., "score": ..}]}`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::http_client::{HttpClientTrait, MultipartUpload};
use crate::domain::DomainError;
use crate::domain::semantic::{ImagePayload, RankedMatch, SemanticSearchProvider};
use crate::infrastructure::observability::record_semantic_request;

const PROVIDER_NAME: &str = "semantic";

/// Connection settings for the ranking service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SemanticSearchConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Hard deadline for a single ranking call
    pub timeout_ms: u64,
    /// Number of candidates requested for text and image queries
    pub top_k: usize,
}

impl Default for SemanticSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            api_key: None,
            timeout_ms: 5_000,
            top_k: 20,
        }
    }
}

impl SemanticSearchConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// HTTP-backed [`SemanticSearchProvider`]
#[derive(Debug)]
pub struct HttpSemanticSearchClient<C: HttpClientTrait> {
    client: C,
    base_url: String,
    auth_header: Option<String>,
    timeout: Duration,
    top_k: usize,
}

impl<C: HttpClientTrait> HttpSemanticSearchClient<C> {
    pub fn new(client: C, config: &SemanticSearchConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_header: config.api_key.as_ref().map(|key| format!("Bearer {}", key)),
            timeout: config.timeout(),
            top_k: config.top_k,
        }
    }

    fn text_url(&self) -> String {
        format!("{}/search/text", self.base_url)
    }

    fn image_url(&self) -> String {
        format!("{}/search/image", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        match &self.auth_header {
            Some(auth) => vec![("Authorization", auth.as_str())],
            None => Vec::new(),
        }
    }

    /// Runs `call` under the configured deadline and records its outcome
    async fn timed<F>(&self, kind: &'static str, call: F) -> Result<Vec<RankedMatch>, DomainError>
    where
        F: std::future::Future<Output = Result<serde_json::Value, DomainError>>,
    {
        let start = Instant::now();

        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(response) => response.and_then(parse_response),
            Err(_) => Err(DomainError::provider(
                PROVIDER_NAME,
                format!("{} search timed out after {:?}", kind, self.timeout),
            )),
        };

        record_semantic_request(kind, result.is_ok(), start.elapsed());

        result
    }
}

#[async_trait]
impl<C: HttpClientTrait> SemanticSearchProvider for HttpSemanticSearchClient<C> {
    async fn rank_by_text(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RankedMatch>, DomainError> {
        let url = self.text_url();
        let body = serde_json::json!({
            "query": query,
            "top_k": top_k,
        });

        let matches = self
            .timed("text", self.client.post_json(&url, self.headers(), &body))
            .await?;

        debug!(matches = matches.len(), "Semantic text ranking complete");
        Ok(matches)
    }

    async fn rank_by_image(&self, payload: &ImagePayload) -> Result<Vec<RankedMatch>, DomainError> {
        let url = self.image_url();
        let upload = MultipartUpload {
            field_name: "image".to_string(),
            file_name: payload.file_name(),
            mime_type: payload.format().mime_type().to_string(),
            bytes: payload.bytes().clone(),
            text_fields: vec![("top_k".to_string(), self.top_k.to_string())],
        };

        let matches = self
            .timed("image", self.client.post_multipart(&url, self.headers(), upload))
            .await?;

        debug!(
            matches = matches.len(),
            bytes = payload.len(),
            "Semantic image ranking complete"
        );
        Ok(matches)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[derive(Debug, Deserialize)]
struct RankingResponse {
    #[serde(default)]
    results: Vec<RankingHit>,
}

#[derive(Debug, Deserialize)]
struct RankingHit {
    #[serde(default, alias = "productId", alias = "id")]
    product_id: Option<serde_json::Value>,
    #[serde(default)]
    score: Option<f64>,
}

/// Keeps hits with a usable id and a score that is finite once narrowed to
/// `f32`; order is left as received
fn parse_response(json: serde_json::Value) -> Result<Vec<RankedMatch>, DomainError> {
    let response: RankingResponse = serde_json::from_value(json).map_err(|e| {
        DomainError::provider(PROVIDER_NAME, format!("Failed to parse ranking response: {}", e))
    })?;

    let matches = response
        .results
        .into_iter()
        .filter_map(|hit| {
            let product_id = match hit.product_id? {
                serde_json::Value::String(s) => s.trim().to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                _ => return None,
            };
            let score = hit.score.map(|s| s as f32).filter(|s| s.is_finite())?;

            (!product_id.is_empty()).then(|| RankedMatch::new(product_id, score))
        })
        .collect();

    Ok(matches)
}
