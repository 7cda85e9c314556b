//! Store counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters updated by the store's access path.
#[derive(Debug, Default)]
pub(crate) struct StatsCounter {
    hits: AtomicU64,
    misses: AtomicU64,
    load_successes: AtomicU64,
    load_failures: AtomicU64,
    evictions: AtomicU64,
    total_load_nanos: AtomicU64,
}

impl StatsCounter {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_load_success(&self, took: Duration) {
        self.load_successes.fetch_add(1, Ordering::Relaxed);
        self.total_load_nanos.fetch_add(took.as_nanos() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_load_failure(&self, took: Duration) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
        self.total_load_nanos.fetch_add(took.as_nanos() as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_evictions(&self, n: u64) {
        self.evictions.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StoreStats {
        StoreStats {
            hit_count: self.hits.load(Ordering::Relaxed),
            miss_count: self.misses.load(Ordering::Relaxed),
            load_success_count: self.load_successes.load(Ordering::Relaxed),
            load_failure_count: self.load_failures.load(Ordering::Relaxed),
            eviction_count: self.evictions.load(Ordering::Relaxed),
            total_load_time: Duration::from_nanos(self.total_load_nanos.load(Ordering::Relaxed)),
        }
    }
}

/// Point-in-time copy of the store counters. Counters only grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub hit_count: u64,
    pub miss_count: u64,
    pub load_success_count: u64,
    pub load_failure_count: u64,
    pub eviction_count: u64,
    pub total_load_time: Duration,
}

impl StoreStats {
    pub fn request_count(&self) -> u64 {
        self.hit_count + self.miss_count
    }

    /// Fraction of requests served by a live entry; 1.0 when there were none.
    pub fn hit_rate(&self) -> f64 {
        match self.request_count() {
            0 => 1.0,
            n => self.hit_count as f64 / n as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_over_requests() {
        let counter = StatsCounter::default();
        assert_eq!(counter.snapshot().hit_rate(), 1.0);

        counter.record_miss();
        counter.record_hit();
        counter.record_hit();
        counter.record_hit();
        let s = counter.snapshot();
        assert_eq!(s.request_count(), 4);
        assert_eq!(s.hit_rate(), 0.75);
    }
}
