//! Discovery service - composes lexical search, semantic ranking, the result
//! cache, merging and personalization into the three discovery operations

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use super::lexical_search::LexicalSearchEngine;
use super::personalization::PersonalizationEnricher;
use crate::domain::DomainError;
use crate::domain::catalog::CatalogRepository;
use crate::domain::discovery::{
    CachedResult, ImageSubmission, MergedProduct, SearchSource, TextSearchResult, TokenLookup,
    merge_ranked, merge_unranked,
};
use crate::domain::semantic::{ImagePayload, RankedMatch, SemanticSearchProvider};
use crate::infrastructure::discovery::ResultCache;
use crate::infrastructure::observability::{
    record_text_search, record_token_issued, record_token_lookup,
};

/// Trait for discovery operations (for dynamic dispatch in AppState)
#[async_trait]
pub trait DiscoveryServiceTrait: Send + Sync {
    /// Lexical store search plus semantic product ranking with lexical fallback
    async fn text_search(
        &self,
        query: &str,
        user_id: Option<&str>,
    ) -> Result<TextSearchResult, DomainError>;

    /// Ranks an image and parks the result under a token
    async fn submit_image(&self, payload: ImagePayload) -> Result<ImageSubmission, DomainError>;

    /// Materializes a parked result set
    async fn lookup_token(
        &self,
        token: &str,
        user_id: Option<&str>,
    ) -> Result<TokenLookup, DomainError>;

    /// Readiness probe over the cache and catalog backends
    async fn check_dependencies(&self) -> Vec<(&'static str, Result<(), DomainError>)>;
}

/// Discovery service implementation
pub struct DiscoveryService {
    lexical: LexicalSearchEngine,
    catalog: Arc<dyn CatalogRepository>,
    semantic: Arc<dyn SemanticSearchProvider>,
    results: ResultCache,
    enricher: PersonalizationEnricher,
    top_k: usize,
}

impl DiscoveryService {
    pub fn new(
        lexical: LexicalSearchEngine,
        catalog: Arc<dyn CatalogRepository>,
        semantic: Arc<dyn SemanticSearchProvider>,
        results: ResultCache,
        enricher: PersonalizationEnricher,
    ) -> Self {
        Self {
            lexical,
            catalog,
            semantic,
            results,
            enricher,
            top_k: 20,
        }
    }

    /// Sets the number of candidates requested from the ranking service
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Semantic ranking on the text path: any failure degrades to "no matches"
    async fn rank_text(&self, query: &str) -> Vec<RankedMatch> {
        match self.semantic.rank_by_text(query, self.top_k).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!(
                    provider = self.semantic.provider_name(),
                    error = %e,
                    "Semantic ranking unavailable, using lexical fallback"
                );
                Vec::new()
            }
        }
    }

    async fn materialize(
        &self,
        product_ids: &[String],
        scores: &[f32],
    ) -> Result<Vec<MergedProduct>, DomainError> {
        if product_ids.len() != scores.len() {
            return Err(DomainError::malformed_cache_entry(format!(
                "{} product ids but {} scores",
                product_ids.len(),
                scores.len()
            )));
        }

        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let products = self.catalog.find_products(product_ids).await?;
        merge_ranked(product_ids, scores, products)
    }
}

#[async_trait]
impl DiscoveryServiceTrait for DiscoveryService {
    #[instrument(skip(self))]
    async fn text_search(
        &self,
        query: &str,
        user_id: Option<&str>,
    ) -> Result<TextSearchResult, DomainError> {
        let query = query.trim();

        if query.is_empty() {
            return Err(DomainError::validation("Query is required"));
        }

        let (stores, ranked) = tokio::join!(self.lexical.search_stores(query), self.rank_text(query));
        let stores = stores?;

        let (products, source) = if ranked.is_empty() {
            let products = self.lexical.search_products(query).await?;
            (merge_unranked(products), SearchSource::Fallback)
        } else {
            let (ids, scores): (Vec<String>, Vec<f32>) = ranked
                .into_iter()
                .map(|m| (m.product_id, m.score))
                .unzip();
            (self.materialize(&ids, &scores).await?, SearchSource::Ai)
        };

        let products = self.enricher.enrich(products, user_id).await?;

        record_text_search(source);
        info!(
            stores = stores.len(),
            products = products.len(),
            source = %source,
            "Text search complete"
        );

        Ok(TextSearchResult {
            stores,
            products,
            source,
        })
    }

    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn submit_image(&self, payload: ImagePayload) -> Result<ImageSubmission, DomainError> {
        let mut matches = self.semantic.rank_by_image(&payload).await.map_err(|e| {
            warn!(error = %e, "Image ranking failed");
            e
        })?;

        if matches.is_empty() {
            info!("Image search returned no matches");
            return Ok(ImageSubmission::NoMatches);
        }

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));

        let token = self.results.issue(&matches).await?;
        record_token_issued();
        info!(candidates = matches.len(), "Image search results parked");

        Ok(ImageSubmission::Issued { token })
    }

    #[instrument(skip(self, token))]
    async fn lookup_token(
        &self,
        token: &str,
        user_id: Option<&str>,
    ) -> Result<TokenLookup, DomainError> {
        let token = token.trim();

        if token.is_empty() {
            return Err(DomainError::validation("Token is required"));
        }

        let entry: CachedResult = match self.results.get(token).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                record_token_lookup("not_found");
                return Ok(TokenLookup::NotFound);
            }
            Err(e @ DomainError::MalformedCacheEntry { .. }) => {
                record_token_lookup("malformed");
                warn!(error = %e, "Cached image search result is malformed");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let products = self.materialize(&entry.product_ids, &entry.scores).await?;
        let products = self.enricher.enrich(products, user_id).await?;

        record_token_lookup("found");
        info!(products = products.len(), "Token lookup complete");

        Ok(TokenLookup::Found { products })
    }

    async fn check_dependencies(&self) -> Vec<(&'static str, Result<(), DomainError>)> {
        let (cache, catalog) = tokio::join!(self.results.ping(), self.catalog.health_check());

        vec![("result_cache", cache), ("catalog", catalog)]
    }
}
