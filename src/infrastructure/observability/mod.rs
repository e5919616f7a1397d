//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    PrometheusMetrics, create_metrics_router, init_metrics, record_cache_early_eviction,
    record_http_request,
    record_semantic_request, record_text_search, record_token_issued, record_token_lookup,
};
