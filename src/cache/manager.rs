// Response cache - normalized prompt keys, TTL expiry and in-flight coalescing
// Author: kelexine (https://github.com/kelexine)

use crate::cache::models::{CacheEntry, CacheStats};
use crate::config::CacheConfig;
use crate::error::{GatewayError, Result};
use crate::gemini::TextGenerator;
use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Shortest interval accepted by [`ResponseCache::spawn_sweeper`].
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

type SharedGeneration = Shared<BoxFuture<'static, Result<String>>>;
type InflightMap = Arc<Mutex<HashMap<String, SharedGeneration>>>;

/// Derive the cache key for a prompt: surrounding whitespace removed, case folded.
pub fn normalize_key(prompt: &str) -> String {
    prompt.trim().to_lowercase()
}

/// Short digest of a key, safe to put in logs.
pub fn key_fingerprint(key: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(key.as_bytes()));
    digest[..12].to_string()
}

/// In-memory cache of generated answers.
///
/// Cloning is cheap and every clone shares the same state. Expired entries
/// are never returned: they are dropped when read and by [`ResponseCache::purge_expired`].
///
/// Independent instances share nothing, including metrics state; the
/// `response_cache_entries` gauge is reported by whoever serves `/metrics`.
#[derive(Clone)]
pub struct ResponseCache {
    config: CacheConfig,
    entries: Arc<Mutex<LruCache<String, CacheEntry>>>,
    inflight: InflightMap,
    stats: Arc<Mutex<CacheStats>>,
}

/// Removes the in-flight marker when the generation task ends, panics included.
struct InflightGuard {
    inflight: InflightMap,
    key: String,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.inflight.lock().remove(&self.key);
    }
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        let entries = match NonZeroUsize::new(config.max_entries) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };

        Self {
            config,
            entries: Arc::new(Mutex::new(entries)),
            inflight: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(Mutex::new(CacheStats::default())),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.config.ttl_seconds)
    }

    /// Cached answer for `prompt`, if a live one exists.
    pub fn get(&self, prompt: &str) -> Option<String> {
        self.lookup(&normalize_key(prompt))
    }

    /// Store `value` for `prompt`, replacing any previous entry wholesale.
    pub fn set(&self, prompt: &str, value: String) {
        self.store(normalize_key(prompt), value);
    }

    /// Answer from cache, or generate, store and return.
    ///
    /// With `coalesce_inflight` enabled, concurrent callers for the same key
    /// share a single generation; the generation runs in its own task, so it
    /// completes and populates the cache even if every caller goes away.
    /// Failures are returned to all waiters and never cached.
    pub async fn get_or_generate(
        &self,
        prompt: &str,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<String> {
        let key = normalize_key(prompt);
        if let Some(value) = self.lookup(&key) {
            return Ok(value);
        }

        if !self.config.coalesce_inflight {
            return self.generate_and_store(&key, prompt, generator.as_ref()).await;
        }

        let generation = {
            let mut inflight = self.inflight.lock();
            if let Some(existing) = inflight.get(&key).cloned() {
                debug!("Joining in-flight generation for key {}", key_fingerprint(&key));
                self.stats.lock().coalesced += 1;
                crate::metrics::record_cache_operation("coalesced");
                existing
            } else {
                // A generation may have completed between the lookup and taking the lock
                if let Some(value) = self.peek(&key) {
                    return Ok(value);
                }
                let generation = self.spawn_generation(key.clone(), prompt.to_string(), generator);
                inflight.insert(key, generation.clone());
                generation
            }
        };

        generation.await
    }

    fn spawn_generation(
        &self,
        key: String,
        prompt: String,
        generator: Arc<dyn TextGenerator>,
    ) -> SharedGeneration {
        let cache = self.clone();
        let handle = tokio::spawn(async move {
            let _guard = InflightGuard {
                inflight: cache.inflight.clone(),
                key: key.clone(),
            };
            cache.generate_and_store(&key, &prompt, generator.as_ref()).await
        });

        async move {
            handle.await.unwrap_or_else(|e| {
                warn!("Generation task failed: {}", e);
                Err(GatewayError::Unknown(format!("generation task failed: {}", e)))
            })
        }
        .boxed()
        .shared()
    }

    async fn generate_and_store(
        &self,
        key: &str,
        prompt: &str,
        generator: &dyn TextGenerator,
    ) -> Result<String> {
        self.stats.lock().generations += 1;
        let text = generator.generate(prompt).await?;
        self.store(key.to_string(), text.clone());
        Ok(text)
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        // Some(None) means present but expired
        let state = entries
            .get(key)
            .map(|entry| (!entry.is_expired(now)).then(|| entry.value.clone()));

        match state {
            Some(Some(value)) => {
                drop(entries);
                debug!("Cache hit for key {}", key_fingerprint(key));
                self.stats.lock().hits += 1;
                crate::metrics::record_cache_operation("hit");
                Some(value)
            }
            Some(None) => {
                entries.pop(key);
                drop(entries);
                debug!("Cache entry expired for key {}", key_fingerprint(key));
                {
                    let mut stats = self.stats.lock();
                    stats.expired += 1;
                    stats.misses += 1;
                }
                crate::metrics::record_cache_operation("expired");
                crate::metrics::record_cache_operation("miss");
                None
            }
            None => {
                drop(entries);
                self.stats.lock().misses += 1;
                crate::metrics::record_cache_operation("miss");
                None
            }
        }
    }

    /// Live value without touching recency or statistics.
    fn peek(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.entries
            .lock()
            .peek(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    fn store(&self, key: String, value: String) {
        if value.trim().is_empty() {
            debug!("Refusing to cache empty value for key {}", key_fingerprint(&key));
            return;
        }

        let entry = CacheEntry::new(value, self.ttl());
        let mut entries = self.entries.lock();
        let displaced = entries.push(key.clone(), entry);
        drop(entries);

        let evicted = matches!(displaced, Some((old_key, _)) if old_key != key);
        {
            let mut stats = self.stats.lock();
            stats.stores += 1;
            if evicted {
                stats.evicted += 1;
            }
        }
        crate::metrics::record_cache_operation("store");
        if evicted {
            crate::metrics::record_cache_operation("evicted");
        }
        debug!("Cached response for key {}", key_fingerprint(&key));
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        drop(entries);

        if !expired.is_empty() {
            self.stats.lock().expired += expired.len() as u64;
            crate::metrics::CACHE_OPERATIONS
                .with_label_values(&["expired"])
                .inc_by(expired.len() as f64);
        }
        expired.len()
    }

    /// Run [`ResponseCache::purge_expired`] every `interval` until the handle is aborted.
    ///
    /// Intervals shorter than [`MIN_SWEEP_INTERVAL`] are raised to it.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = cache.purge_expired();
                if removed > 0 {
                    debug!("Cache sweep removed {} expired entries", removed);
                }
            }
        })
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of generations currently in flight.
    pub fn inflight(&self) -> usize {
        self.inflight.lock().len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        self.entries.lock().clear();
        debug!("Cache cleared");
    }
}
