//! Cache metrics for observability

use prometheus::{CounterVec, Opts, Registry};
use std::sync::OnceLock;

use crate::keys::namespace;

static METRICS: OnceLock<CacheMetricsInner> = OnceLock::new();

struct CacheMetricsInner {
    hits: CounterVec,
    misses: CounterVec,
    writes: CounterVec,
    errors: CounterVec,
}

impl CacheMetricsInner {
    fn new() -> Self {
        Self {
            hits: CounterVec::new(
                Opts::new("omniview_cache_hits_total", "Total cache hits"),
                &["namespace"],
            )
            .expect("valid metric definition"),
            misses: CounterVec::new(
                Opts::new("omniview_cache_misses_total", "Total cache misses"),
                &["namespace"],
            )
            .expect("valid metric definition"),
            writes: CounterVec::new(
                Opts::new("omniview_cache_writes_total", "Total cache writes"),
                &["namespace"],
            )
            .expect("valid metric definition"),
            errors: CounterVec::new(
                Opts::new("omniview_cache_errors_total", "Total cache backend errors"),
                &["namespace", "op"],
            )
            .expect("valid metric definition"),
        }
    }

    fn register(&self, registry: &Registry) -> Result<(), prometheus::Error> {
        registry.register(Box::new(self.hits.clone()))?;
        registry.register(Box::new(self.misses.clone()))?;
        registry.register(Box::new(self.writes.clone()))?;
        registry.register(Box::new(self.errors.clone()))?;
        Ok(())
    }
}

fn get_metrics() -> &'static CacheMetricsInner {
    METRICS.get_or_init(CacheMetricsInner::new)
}

/// Cache metrics wrapper
#[derive(Clone, Default)]
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn new() -> Self {
        Self
    }

    /// Register metrics with a Prometheus registry
    pub fn register(registry: &Registry) -> Result<(), prometheus::Error> {
        get_metrics().register(registry)
    }

    pub fn record_hit(&self, key: &str) {
        get_metrics().hits.with_label_values(&[namespace(key)]).inc();
    }

    pub fn record_miss(&self, key: &str) {
        get_metrics().misses.with_label_values(&[namespace(key)]).inc();
    }

    pub fn record_write(&self, key: &str) {
        get_metrics().writes.with_label_values(&[namespace(key)]).inc();
    }

    pub fn record_error(&self, key: &str, op: &str) {
        get_metrics()
            .errors
            .with_label_values(&[namespace(key), op])
            .inc();
    }
}
