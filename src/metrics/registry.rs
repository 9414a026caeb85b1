// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_gauge_with_registry,
    register_histogram_vec_with_registry, register_histogram_with_registry, CounterVec, Encoder,
    Gauge, Histogram, HistogramVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // REQUEST METRICS
    // ============================================================================

    /// Total number of HTTP requests handled by the gateway
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec_with_registry!(
        Opts::new("gateway_requests_total", "Total number of gateway requests"),
        &["endpoint", "status_code"],
        REGISTRY
    ).unwrap();

    /// Request duration histogram
    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("gateway_request_duration_seconds", "Request duration in seconds")
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // GENERATION METRICS
    // ============================================================================

    /// Upstream generation calls by outcome (success or error category)
    pub static ref GENERATION_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("generation_calls_total", "Total upstream generation calls"),
        &["outcome"],
        REGISTRY
    ).unwrap();

    /// Upstream generation duration
    pub static ref GENERATION_DURATION: Histogram = register_histogram_with_registry!(
        prometheus::HistogramOpts::new("generation_duration_seconds", "Upstream generation duration")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        REGISTRY
    ).unwrap();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// Cache operations
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("response_cache_operations_total", "Total response cache operations"),
        &["operation"], // operation: hit, miss, store, expired, evicted, coalesced
        REGISTRY
    ).unwrap();

    /// Current cache entries
    pub static ref CACHE_ENTRIES: Gauge = register_gauge_with_registry!(
        Opts::new("response_cache_entries", "Current number of cached responses"),
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        crate::metrics::record_request("/ai/get-response", 200, 0.01);
        crate::metrics::record_generation("success", 0.2);
        crate::metrics::record_cache_operation("hit");
        crate::metrics::update_cache_entries(3);

        let metrics = gather_metrics();
        assert!(metrics.contains("gateway_requests_total"));
        assert!(metrics.contains("generation_calls_total"));
        assert!(metrics.contains("response_cache_operations_total"));
        assert!(metrics.contains("response_cache_entries"));
    }
}
