//! In-memory cache implementation using moka

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::notification::RemovalCause;
use tokio::time::Instant;
use tracing::warn;

use crate::domain::DomainError;
use crate::domain::cache::Cache;
use crate::infrastructure::observability::record_cache_early_eviction;

/// Configuration for in-memory cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries. Once reached, live entries are evicted
    /// before their TTL, so size it for the peak number of tokens issued
    /// within one TTL window.
    pub max_capacity: u64,
    /// Upper bound on any entry's lifetime; per-entry TTLs are checked on read
    pub max_ttl: Duration,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            max_ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl InMemoryCacheConfig {
    /// Creates a new configuration with specified max capacity
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Cache entry stored in moka
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Serialized JSON value
    data: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Thread-safe in-memory cache implementation using moka
///
/// Expiry is tracked on the tokio clock, so tests can pause and advance
/// time instead of sleeping. Live entries dropped for capacity are logged
/// and counted.
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, CacheEntry>,
    config: InMemoryCacheConfig,
    early_evictions: Arc<AtomicU64>,
}

impl InMemoryCache {
    /// Creates a new in-memory cache with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    /// Creates a new in-memory cache with the given configuration
    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let early_evictions = Arc::new(AtomicU64::new(0));
        let counter = early_evictions.clone();
        let max_capacity = config.max_capacity;

        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.max_ttl)
            .eviction_listener(move |key: Arc<String>, entry: CacheEntry, cause| {
                if cause == RemovalCause::Size && !entry.is_expired() {
                    counter.fetch_add(1, Ordering::Relaxed);
                    record_cache_early_eviction();
                    warn!(
                        key = %key,
                        max_capacity,
                        "Live cache entry evicted before its TTL, raise cache.max_capacity"
                    );
                }
            })
            .build();

        Self {
            cache,
            config,
            early_evictions,
        }
    }

    /// Number of entries evicted for capacity while still live
    pub fn early_evictions(&self) -> u64 {
        self.early_evictions.load(Ordering::Relaxed)
    }

    async fn live_entry(&self, key: &str) -> Option<CacheEntry> {
        let entry = self.cache.get(key).await?;

        if entry.is_expired() {
            self.cache.remove(key).await;
            return None;
        }

        Some(entry)
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.live_entry(key).await.map(|entry| entry.data))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        if ttl.is_zero() {
            return Err(DomainError::cache("Cache entries require a non-zero TTL"));
        }

        let entry = CacheEntry {
            data: value.to_string(),
            expires_at: Instant::now() + ttl.min(self.config.max_ttl),
        };

        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::CacheExt;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();

        cache
            .set("key1", &"value1", Duration::from_secs(60))
            .await
            .unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache = InMemoryCache::new();

        let result: Option<String> = cache.get("missing").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = InMemoryCache::new();

        cache
            .set("key1", &"value1", Duration::from_secs(300))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));

        tokio::time::advance(Duration::from_secs(2)).await;
        let result: Option<String> = cache.get("key1").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_reads_do_not_extend_or_consume() {
        let cache = InMemoryCache::new();

        cache
            .set("key1", &"value1", Duration::from_secs(10))
            .await
            .unwrap();

        for _ in 0..3 {
            let value: Option<String> = cache.get("key1").await.unwrap();
            assert!(value.is_some());
            tokio::time::advance(Duration::from_secs(3)).await;
        }

        tokio::time::advance(Duration::from_secs(2)).await;
        let value: Option<String> = cache.get("key1").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_rejected() {
        let cache = InMemoryCache::new();

        let result = cache.set_raw("key1", "\"v\"", Duration::ZERO).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_is_capped_by_max_ttl() {
        let config = InMemoryCacheConfig {
            max_ttl: Duration::from_secs(60),
            ..Default::default()
        };
        let cache = InMemoryCache::with_config(config);

        cache
            .set("key1", &"value1", Duration::from_secs(300))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;
        let result: Option<String> = cache.get("key1").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_capacity_eviction_of_live_entry_is_counted() {
        let cache = InMemoryCache::with_config(InMemoryCacheConfig::default().with_max_capacity(1));

        for key in ["key1", "key2", "key3"] {
            cache
                .set(key, &"value", Duration::from_secs(300))
                .await
                .unwrap();
            cache.cache.run_pending_tasks().await;
        }

        assert!(cache.cache.entry_count() <= 1);
        assert!(cache.early_evictions() >= 2);
    }

    #[tokio::test]
    async fn test_no_early_evictions_within_capacity() {
        let cache = InMemoryCache::new();

        for i in 0..100 {
            cache
                .set(&format!("key{}", i), &i, Duration::from_secs(300))
                .await
                .unwrap();
        }
        cache.cache.run_pending_tasks().await;

        assert_eq!(cache.early_evictions(), 0);
    }
}
