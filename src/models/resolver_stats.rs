use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Rolling counters shared by every call on a resolver.
///
/// Counters are independent relaxed atomics: a snapshot taken during concurrent calls may mix
/// values from before and after a given call, but no increment is ever lost.
#[derive(Debug, Default)]
pub struct ResolverStats {
    calls: AtomicU64,
    cache_hits: AtomicU64,
    timeouts: AtomicU64,
    pipeline_failures: AtomicU64,
    entities_returned: AtomicU64,
    total_micros: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolverStatsSnapshot {
    pub calls: u64,
    pub cache_hits: u64,
    pub timeouts: u64,
    pub pipeline_failures: u64,
    pub entities_returned: u64,
    pub average_latency_micros: f64,
}

impl ResolverStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_call(&self, elapsed: Duration, entities: usize) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.entities_returned
            .fetch_add(entities as u64, Ordering::Relaxed);
        self.total_micros.fetch_add(
            u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            Ordering::Relaxed,
        );
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pipeline_failure(&self) {
        self.pipeline_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ResolverStatsSnapshot {
        let calls = self.calls.load(Ordering::Relaxed);
        let total_micros = self.total_micros.load(Ordering::Relaxed);

        ResolverStatsSnapshot {
            calls,
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            pipeline_failures: self.pipeline_failures.load(Ordering::Relaxed),
            entities_returned: self.entities_returned.load(Ordering::Relaxed),
            average_latency_micros: if calls == 0 {
                0.0
            } else {
                total_micros as f64 / calls as f64
            },
        }
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.timeouts.store(0, Ordering::Relaxed);
        self.pipeline_failures.store(0, Ordering::Relaxed);
        self.entities_returned.store(0, Ordering::Relaxed);
        self.total_micros.store(0, Ordering::Relaxed);
    }
}
