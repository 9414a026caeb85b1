// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics, CACHE_ENTRIES, CACHE_OPERATIONS, GENERATION_CALLS, GENERATION_DURATION,
    REQUESTS_TOTAL, REQUEST_DURATION,
};

/// Helper to record request metrics
pub fn record_request(endpoint: &str, status_code: u16, duration_secs: f64) {
    REQUESTS_TOTAL
        .with_label_values(&[endpoint, &status_code.to_string()])
        .inc();

    REQUEST_DURATION
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}

/// Helper to record an upstream generation attempt
pub fn record_generation(outcome: &str, duration_secs: f64) {
    GENERATION_CALLS.with_label_values(&[outcome]).inc();
    GENERATION_DURATION.observe(duration_secs);
}

pub fn record_cache_operation(operation: &str) {
    CACHE_OPERATIONS.with_label_values(&[operation]).inc();
}

pub fn update_cache_entries(count: usize) {
    CACHE_ENTRIES.set(count as f64);
}

lazy_static::lazy_static! {
    static ref SCRAPE_LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());
}

/// Render the registry with the cache gauge set from the serving gateway's cache.
///
/// Caches never write the gauge themselves, so independent instances do not
/// overwrite each other's count.
pub fn gather_with_cache_entries(count: usize) -> String {
    let _scrape = SCRAPE_LOCK.lock();
    update_cache_entries(count);
    gather_metrics()
}
