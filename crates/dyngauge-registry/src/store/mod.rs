//! Concurrent expire-after-access store with single-flight creation.
//!
//! Entries live in a `DashMap`. A hit only takes the shard read lock; a miss
//! takes the shard write lock through the entry API and runs the factory while
//! holding it, so racing callers for the same key wait for that one
//! construction and then observe its result. Keys in other shards are not
//! blocked.
//!
//! There is no background timer. Every call checks whether a sweep is due
//! (at most one per sweep interval, claimed by a single caller) and prunes
//! expired entries inline. Between sweeps an expired entry may still occupy
//! memory, but it is never handed out by `get_or_create`, listed by
//! `snapshot`, or counted by `size`.
//!
//! The factory must not call back into the store it belongs to: it runs under
//! the shard write lock.

mod stats;

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use dyngauge_core::error::{DynGaugeError, Result};

use crate::clock::{Clock, MonotonicClock};

use stats::StatsCounter;
pub use stats::StoreStats;

type Factory<K, V> = Box<dyn Fn(&K) -> Result<V> + Send + Sync>;

/// Read-only view of a store's counters, independent of its key/value types.
pub trait StatsSource: Send + Sync {
    fn stats(&self) -> StoreStats;
    fn size(&self) -> usize;
}

struct Slot<V> {
    value: Arc<V>,
    /// Nanoseconds since the store's origin.
    last_access: AtomicU64,
}

impl<V> Slot<V> {
    fn new(value: Arc<V>, now: u64) -> Self {
        Self { value, last_access: AtomicU64::new(now) }
    }

    fn touch(&self, now: u64) {
        self.last_access.fetch_max(now, Ordering::Relaxed);
    }

    fn idle(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_access.load(Ordering::Relaxed))
    }
}

pub struct ExpiringStore<K, V> {
    map: DashMap<K, Slot<V>>,
    factory: Factory<K, V>,
    ttl_nanos: u64,
    sweep_interval_nanos: u64,
    clock: Arc<dyn Clock>,
    origin: Instant,
    last_sweep: AtomicU64,
    sweeping: AtomicBool,
    stats: StatsCounter,
}

pub struct ExpiringStoreBuilder {
    expire_after_access: Duration,
    sweep_interval: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl Default for ExpiringStoreBuilder {
    fn default() -> Self {
        Self {
            expire_after_access: Duration::from_secs(15 * 60),
            sweep_interval: None,
            clock: Arc::new(MonotonicClock),
        }
    }
}

impl ExpiringStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inactivity window measured from the last access of an entry.
    pub fn expire_after_access(mut self, ttl: Duration) -> Self {
        self.expire_after_access = ttl;
        self
    }

    /// Minimum spacing between inline sweeps. Defaults to half the window.
    pub fn sweep_interval(mut self, every: Duration) -> Self {
        self.sweep_interval = Some(every);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build<K, V, F>(self, factory: F) -> ExpiringStore<K, V>
    where
        K: Eq + Hash,
        F: Fn(&K) -> Result<V> + Send + Sync + 'static,
    {
        let ttl_nanos = duration_nanos(self.expire_after_access);
        let sweep_interval_nanos = self
            .sweep_interval
            .map(duration_nanos)
            .unwrap_or(ttl_nanos / 2)
            .max(1);
        let origin = self.clock.now();

        ExpiringStore {
            map: DashMap::new(),
            factory: Box::new(factory),
            ttl_nanos,
            sweep_interval_nanos,
            clock: self.clock,
            origin,
            last_sweep: AtomicU64::new(0),
            sweeping: AtomicBool::new(false),
            stats: StatsCounter::default(),
        }
    }
}

fn duration_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

impl<K, V> ExpiringStore<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
{
    /// Return the live value for `key`, creating it if absent or expired.
    ///
    /// Refreshes the entry's last-access time. A factory error is returned to
    /// the caller and nothing is installed for `key`.
    pub fn get_or_create(&self, key: &K) -> Result<Arc<V>> {
        let now = self.tick();
        self.maybe_sweep(now);

        if let Some(slot) = self.map.get(key) {
            if !self.expired(&slot, now) {
                slot.touch(now);
                self.stats.record_hit();
                return Ok(Arc::clone(&slot.value));
            }
        }

        match self.map.entry(key.clone()) {
            MapEntry::Occupied(mut occupied) => {
                // Another caller may have installed it between the read and the write lock.
                if !self.expired(occupied.get(), now) {
                    occupied.get().touch(now);
                    self.stats.record_hit();
                    return Ok(Arc::clone(&occupied.get().value));
                }
                self.stats.record_evictions(1);
                match self.load(key) {
                    Ok(value) => {
                        occupied.insert(Slot::new(Arc::clone(&value), now));
                        Ok(value)
                    }
                    Err(e) => {
                        occupied.remove();
                        Err(e)
                    }
                }
            }
            MapEntry::Vacant(vacant) => {
                let value = self.load(key)?;
                vacant.insert(Slot::new(Arc::clone(&value), now));
                Ok(value)
            }
        }
    }

    /// Live values at call time. Weakly consistent with concurrent writers.
    pub fn snapshot(&self) -> Vec<Arc<V>> {
        let now = self.tick();
        self.maybe_sweep(now);
        self.map
            .iter()
            .filter(|r| !self.expired(r.value(), now))
            .map(|r| Arc::clone(&r.value().value))
            .collect()
    }

    /// Number of live entries, counted the same way `snapshot` filters them.
    pub fn size(&self) -> usize {
        let now = self.tick();
        self.maybe_sweep(now);
        self.map.iter().filter(|r| !self.expired(r.value(), now)).count()
    }

    pub fn stats(&self) -> StoreStats {
        self.stats.snapshot()
    }

    pub fn expire_after_access(&self) -> Duration {
        Duration::from_nanos(self.ttl_nanos)
    }

    fn load(&self, key: &K) -> Result<Arc<V>> {
        self.stats.record_miss();
        // Load time is wall time, also under a paused clock.
        let started = Instant::now();
        match (self.factory)(key) {
            Ok(v) => {
                self.stats.record_load_success(started.elapsed());
                Ok(Arc::new(v))
            }
            Err(e) => {
                self.stats.record_load_failure(started.elapsed());
                tracing::error!(id = %key, error = %e, "failed to create monitor");
                Err(match e {
                    e @ DynGaugeError::Creation { .. } => e,
                    other => DynGaugeError::Creation { id: key.to_string(), reason: other.to_string() },
                })
            }
        }
    }

    fn tick(&self) -> u64 {
        duration_nanos(self.clock.now().saturating_duration_since(self.origin))
    }

    fn expired(&self, slot: &Slot<V>, now: u64) -> bool {
        slot.idle(now) > self.ttl_nanos
    }

    fn maybe_sweep(&self, now: u64) {
        let last = self.last_sweep.load(Ordering::Relaxed);
        if now.saturating_sub(last) < self.sweep_interval_nanos {
            return;
        }
        if self
            .sweeping
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        self.last_sweep.store(now, Ordering::Relaxed);

        let ttl = self.ttl_nanos;
        let mut evicted = 0u64;
        self.map.retain(|_, slot| {
            let keep = slot.idle(now) <= ttl;
            if !keep {
                evicted += 1;
            }
            keep
        });
        self.sweeping.store(false, Ordering::Release);

        if evicted > 0 {
            self.stats.record_evictions(evicted);
            tracing::debug!(evicted, remaining = self.map.len(), "pruned expired entries");
        }
    }
}

impl<K, V> StatsSource for ExpiringStore<K, V>
where
    K: Eq + Hash + Clone + fmt::Display + Send + Sync,
    V: Send + Sync,
{
    fn stats(&self) -> StoreStats {
        ExpiringStore::stats(self)
    }

    fn size(&self) -> usize {
        ExpiringStore::size(self)
    }
}

impl<K: Eq + Hash, V> fmt::Debug for ExpiringStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringStore")
            .field("entries", &self.map.len())
            .field("expire_after_access", &Duration::from_nanos(self.ttl_nanos))
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::clock::PausedClock;

    fn store(clock: &PausedClock) -> ExpiringStore<String, u32> {
        ExpiringStoreBuilder::new()
            .expire_after_access(Duration::from_secs(10))
            .clock(Arc::new(clock.clone()))
            .build(|k: &String| Ok(k.len() as u32))
    }

    #[test]
    fn hit_refreshes_last_access() {
        let clock = PausedClock::default();
        let s = store(&clock);
        let first = s.get_or_create(&"abc".to_string()).unwrap();

        clock.advance(Duration::from_secs(8));
        let again = s.get_or_create(&"abc".to_string()).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        // 16s after creation but only 8s after the last access.
        clock.advance(Duration::from_secs(8));
        assert_eq!(s.size(), 1);
        let third = s.get_or_create(&"abc".to_string()).unwrap();
        assert!(Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn expired_entry_is_hidden_before_sweep_and_replaced_on_access() {
        let clock = PausedClock::default();
        let s: ExpiringStore<String, u32> = ExpiringStoreBuilder::new()
            .expire_after_access(Duration::from_secs(10))
            .sweep_interval(Duration::from_secs(3600))
            .clock(Arc::new(clock.clone()))
            .build(|k: &String| Ok(k.len() as u32));

        let first = s.get_or_create(&"k".to_string()).unwrap();
        clock.advance(Duration::from_secs(11));

        assert_eq!(s.size(), 0);
        assert!(s.snapshot().is_empty());

        let second = s.get_or_create(&"k".to_string()).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(s.stats().eviction_count, 1);
        assert_eq!(s.stats().miss_count, 2);
    }

    #[test]
    fn sweep_prunes_and_counts_evictions() {
        let clock = PausedClock::default();
        let s = store(&clock);
        for k in ["a", "b", "c"] {
            s.get_or_create(&k.to_string()).unwrap();
        }
        clock.advance(Duration::from_secs(11));
        s.get_or_create(&"d".to_string()).unwrap();

        assert_eq!(s.map.len(), 1);
        assert_eq!(s.stats().eviction_count, 3);
    }

    #[test]
    fn factory_error_installs_nothing() {
        let s: ExpiringStore<String, u32> = ExpiringStoreBuilder::new()
            .build(|k: &String| Err(DynGaugeError::Internal(format!("no gauge for {k}"))));

        let err = s.get_or_create(&"boom".to_string()).unwrap_err();
        assert!(matches!(err, DynGaugeError::Creation { ref id, .. } if id == "boom"));
        assert_eq!(s.size(), 0);
        assert_eq!(s.stats().load_failure_count, 1);
        assert_eq!(s.stats().load_success_count, 0);
    }
}
