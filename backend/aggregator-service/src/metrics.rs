//! Prometheus metrics for the aggregator

use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::OnceLock;
use tracing::warn;

use crate::models::Platform;

static REGISTRY: OnceLock<Registry> = OnceLock::new();
static UPSTREAM_REQUESTS: OnceLock<CounterVec> = OnceLock::new();

fn upstream_requests() -> &'static CounterVec {
    UPSTREAM_REQUESTS.get_or_init(|| {
        CounterVec::new(
            Opts::new(
                "omniview_upstream_requests_total",
                "Upstream provider requests by platform and outcome",
            ),
            &["platform", "outcome"],
        )
        .expect("valid metric definition")
    })
}

/// Registry with service and cache metrics registered once.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let registry = Registry::new();
        if let Err(e) = registry.register(Box::new(upstream_requests().clone())) {
            warn!(error = %e, "Failed to register upstream metrics");
        }
        if let Err(e) = stream_cache::CacheMetrics::register(&registry) {
            warn!(error = %e, "Failed to register cache metrics");
        }
        registry
    })
}

pub fn record_upstream(platform: Platform, outcome: &str) {
    upstream_requests()
        .with_label_values(&[platform.as_str(), outcome])
        .inc();
}

/// Text exposition format for `GET /metrics`.
pub fn gather_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&registry().gather(), &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}
