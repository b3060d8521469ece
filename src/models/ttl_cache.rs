use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

// moka rejects time-to-live values above 1000 years.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Capacity and time-to-live for a [`TtlCache`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl: Duration,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

/// A bounded, thread-safe cache whose entries expire after a fixed time-to-live.
///
/// Backed by a `moka` cache with least-recently-used eviction, so an entry that is never read
/// again is the first to go once the cache is over capacity. Each entry also carries its
/// creation time, and a read past the TTL drops the entry instead of returning it, whether or
/// not moka has expired it yet.
pub struct TtlCache<K, V> {
    config: CacheConfig,
    entries: Cache<K, CacheEntry<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.capacity as u64)
            .time_to_live(config.ttl.min(MAX_TTL))
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self { config, entries }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Returns a clone of the cached value, or `None` if it is missing or expired.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Same as [`TtlCache::get`], against an explicit clock reading.
    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let entry = self.entries.get(key)?;

        if now.saturating_duration_since(entry.created_at) >= self.config.ttl {
            self.entries.invalidate(key);
            return None;
        }

        Some(entry.value)
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Inserts (or replaces) a value, then applies any eviction the insert made necessary.
    pub fn insert_at(&self, key: K, value: V, now: Instant) {
        if self.config.capacity == 0 {
            return;
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
            },
        );
        self.entries.run_pending_tasks();
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }

    /// Number of stored entries after pending evictions have been applied.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> fmt::Debug for TtlCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("config", &self.config)
            .field("entry_count", &self.entries.entry_count())
            .finish()
    }
}
