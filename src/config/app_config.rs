use serde::Deserialize;

use crate::infrastructure::cache::CacheConfig;
use crate::infrastructure::catalog::DatabaseConfig;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::semantic::SemanticSearchConfig;
use crate::infrastructure::services::LexicalSearchConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub semantic: SemanticSearchConfig,
    pub search: LexicalSearchConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for image uploads
    pub max_upload_bytes: usize,
    /// Grace period for in-flight requests after a shutdown signal
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 10 * 1024 * 1024,
            shutdown_timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::CacheType;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.database.url.is_none());
        assert_eq!(config.cache.cache_type, CacheType::InMemory);
        assert_eq!(config.semantic.timeout_ms, 5_000);
        assert_eq!(config.search.product_limit, 50);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("server.port", 9090)
            .unwrap()
            .set_override("cache.type", "redis")
            .unwrap()
            .set_override("cache.redis_url", "redis://cache:6379")
            .unwrap()
            .set_override("logging.format", "json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.cache.cache_type, CacheType::Redis);
        assert_eq!(config.cache.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.semantic.top_k, 20);
    }
}
