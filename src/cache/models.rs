//! Response cache entry and statistics models.

// Author: kelexine (https://github.com/kelexine)

use std::time::Duration;
use tokio::time::Instant;

/// One generated answer, immutable once created.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Generated response text.
    pub value: String,
    /// When the entry was stored.
    pub created_at: Instant,
    /// `created_at + ttl`; reads at or after this instant are misses.
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn new(value: String, ttl: Duration) -> Self {
        let created_at = Instant::now();
        Self {
            value,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Statistics for cache operations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a live entry.
    pub hits: u64,
    /// Lookups that found nothing usable (absent or expired).
    pub misses: u64,
    /// Entries written after a successful generation.
    pub stores: u64,
    /// Entries dropped because their TTL elapsed.
    pub expired: u64,
    /// Entries dropped by the size bound.
    pub evicted: u64,
    /// Callers that joined a generation already in flight.
    pub coalesced: u64,
    /// Upstream generations started.
    pub generations: u64,
}
