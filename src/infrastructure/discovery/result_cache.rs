//! Token-keyed store for image-search result sets

use std::sync::Arc;

use tracing::debug;

use super::token::TokenGenerator;
use crate::domain::cache::{Cache, CacheExt};
use crate::domain::discovery::{CachedResult, RESULT_TOKEN_TTL};
use crate::domain::semantic::RankedMatch;
use crate::domain::DomainError;

const KEY_NAMESPACE: &str = "search:image";

/// Parks ranked image-search results under a random token.
///
/// Every entry is written once with the fixed result TTL and never updated
/// or deleted here; the backend expires it. Concurrent reads are plain
/// cache reads.
#[derive(Debug, Clone)]
pub struct ResultCache {
    cache: Arc<dyn Cache>,
    generator: TokenGenerator,
}

impl ResultCache {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self {
            cache,
            generator: TokenGenerator::new(),
        }
    }

    fn key(token: &str) -> String {
        format!("{}:{}", KEY_NAMESPACE, token)
    }

    /// Stores ranked matches under a fresh token and returns the token
    pub async fn issue(&self, matches: &[RankedMatch]) -> Result<String, DomainError> {
        let token = self.generator.generate();
        let entry = CachedResult::from_matches(token, matches);

        self.put(&entry).await
    }

    /// Writes `entry` under its own token with the fixed TTL
    pub async fn put(&self, entry: &CachedResult) -> Result<String, DomainError> {
        if entry.product_ids.len() != entry.scores.len() {
            return Err(DomainError::internal(format!(
                "Refusing to cache misaligned result: {} ids, {} scores",
                entry.product_ids.len(),
                entry.scores.len()
            )));
        }

        self.cache
            .set(&Self::key(&entry.token), entry, RESULT_TOKEN_TTL)
            .await?;

        debug!(candidates = entry.len(), "Parked image search result");

        Ok(entry.token.clone())
    }

    /// Reads a parked result set.
    ///
    /// Returns `Ok(None)` for expired, unknown and ill-formed tokens alike,
    /// and `MalformedCacheEntry` when the stored payload breaks alignment.
    pub async fn get(&self, token: &str) -> Result<Option<CachedResult>, DomainError> {
        if !TokenGenerator::is_well_formed(token) {
            return Ok(None);
        }

        match self.cache.get_raw(&Self::key(token)).await? {
            Some(raw) => CachedResult::parse(token, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// Verifies the cache backend is reachable
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.cache.ping().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::cache::mock::MockCache;
    use crate::infrastructure::cache::InMemoryCache;

    fn matches() -> Vec<RankedMatch> {
        vec![
            RankedMatch::new("P3", 0.95),
            RankedMatch::new("P1", 0.9),
            RankedMatch::new("P2", 0.7),
        ]
    }

    #[tokio::test]
    async fn test_issue_writes_entry_with_fixed_ttl() {
        let mock = Arc::new(MockCache::new());
        let cache = ResultCache::new(mock.clone());

        let token = cache.issue(&matches()).await.unwrap();

        let key = format!("search:image:{}", token);
        assert_eq!(mock.keys(), vec![key.clone()]);
        assert_eq!(mock.ttl_of(&key), Some(Duration::from_secs(300)));
    }

    #[tokio::test]
    async fn test_get_returns_same_pairing() {
        let cache = ResultCache::new(Arc::new(InMemoryCache::new()));

        let token = cache.issue(&matches()).await.unwrap();
        let entry = cache.get(&token).await.unwrap().unwrap();

        assert_eq!(entry.token, token);
        assert_eq!(entry.product_ids, vec!["P3", "P1", "P2"]);
        assert_eq!(entry.scores, vec![0.95, 0.9, 0.7]);
    }

    #[tokio::test]
    async fn test_entry_survives_repeated_reads() {
        let cache = ResultCache::new(Arc::new(InMemoryCache::new()));
        let token = cache.issue(&matches()).await.unwrap();

        for _ in 0..3 {
            assert!(cache.get(&token).await.unwrap().is_some());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_after_ttl_is_not_found() {
        let cache = ResultCache::new(Arc::new(InMemoryCache::new()));
        let token = cache.issue(&matches()).await.unwrap();

        tokio::time::advance(Duration::from_secs(301)).await;

        assert!(cache.get(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fabricated_token_is_not_found() {
        let cache = ResultCache::new(Arc::new(InMemoryCache::new()));

        let fabricated = TokenGenerator::new().generate();
        assert!(cache.get(&fabricated).await.unwrap().is_none());
        assert!(cache.get("../../etc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_misaligned_payload_is_malformed() {
        let token = TokenGenerator::new().generate();
        let mock = MockCache::new().with_raw_entry(
            &format!("search:image:{}", token),
            r#"{"productIds":["P1","P2"],"scores":[0.4]}"#,
            Duration::from_secs(300),
        );
        let cache = ResultCache::new(Arc::new(mock));

        let err = cache.get(&token).await.unwrap_err();
        assert!(matches!(err, DomainError::MalformedCacheEntry { .. }));
    }

    #[tokio::test]
    async fn test_put_rejects_misaligned_entry() {
        let mock = Arc::new(MockCache::new());
        let cache = ResultCache::new(mock.clone());

        let mut entry = CachedResult::from_matches(TokenGenerator::new().generate(), &matches());
        entry.scores.pop();

        assert!(cache.put(&entry).await.is_err());
        assert_eq!(mock.write_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let cache = ResultCache::new(Arc::new(MockCache::new().with_error("connection refused")));

        let err = cache.issue(&matches()).await.unwrap_err();
        assert!(matches!(err, DomainError::Cache { .. }));
    }
}
