//! Read-only monitor over an expiring store's counters.
//!
//! Lets operators tell "no data" apart from a misbehaving registry, e.g. an
//! eviction count that climbs as fast as the miss count because the
//! inactivity window is shorter than the update cadence.

use std::fmt;
use std::sync::Arc;

use dyngauge_core::MonitorId;

use super::{CompositeMonitor, Monitor, MonitorValue};
use crate::store::StatsSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Hits,
    Misses,
    LoadSuccesses,
    LoadFailures,
    Evictions,
    /// Nanoseconds spent in the factory.
    TotalLoadTime,
    Size,
}

impl StatKind {
    pub const ALL: [StatKind; 7] = [
        StatKind::Hits,
        StatKind::Misses,
        StatKind::LoadSuccesses,
        StatKind::LoadFailures,
        StatKind::Evictions,
        StatKind::TotalLoadTime,
        StatKind::Size,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatKind::Hits => "hitCount",
            StatKind::Misses => "missCount",
            StatKind::LoadSuccesses => "loadSuccessCount",
            StatKind::LoadFailures => "loadExceptionCount",
            StatKind::Evictions => "evictionCount",
            StatKind::TotalLoadTime => "totalLoadTime",
            StatKind::Size => "size",
        }
    }

    fn read(self, source: &dyn StatsSource) -> u64 {
        match self {
            StatKind::Hits => source.stats().hit_count,
            StatKind::Misses => source.stats().miss_count,
            StatKind::LoadSuccesses => source.stats().load_success_count,
            StatKind::LoadFailures => source.stats().load_failure_count,
            StatKind::Evictions => source.stats().eviction_count,
            StatKind::TotalLoadTime => {
                u64::try_from(source.stats().total_load_time.as_nanos()).unwrap_or(u64::MAX)
            }
            StatKind::Size => source.size() as u64,
        }
    }
}

/// One store counter exposed as a leaf monitor. Reads are live.
pub struct StatCounter {
    id: MonitorId,
    kind: StatKind,
    source: Arc<dyn StatsSource>,
}

impl fmt::Debug for StatCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatCounter").field("id", &self.id).field("kind", &self.kind).finish()
    }
}

impl Monitor for StatCounter {
    fn id(&self) -> &MonitorId {
        &self.id
    }

    fn value(&self) -> MonitorValue {
        MonitorValue::Long(self.kind.read(self.source.as_ref()))
    }
}

/// Composite whose children are the store's counters; its own value is the
/// live entry count.
pub struct StoreMonitor {
    id: MonitorId,
    source: Arc<dyn StatsSource>,
    counters: Vec<Arc<StatCounter>>,
}

impl StoreMonitor {
    pub fn new(name: &str, source: Arc<dyn StatsSource>) -> Self {
        let counters = StatKind::ALL
            .iter()
            .map(|&kind| {
                Arc::new(StatCounter {
                    id: MonitorId::builder(kind.name()).with_tag("class", name).build(),
                    kind,
                    source: Arc::clone(&source),
                })
            })
            .collect();
        Self { id: MonitorId::of(name), source, counters }
    }

    pub fn counter(&self, kind: StatKind) -> Option<Arc<StatCounter>> {
        self.counters.iter().find(|c| c.kind == kind).cloned()
    }
}

impl fmt::Debug for StoreMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreMonitor")
            .field("id", &self.id)
            .field("stats", &self.source.stats())
            .finish()
    }
}

impl Monitor for StoreMonitor {
    fn id(&self) -> &MonitorId {
        &self.id
    }

    fn value(&self) -> MonitorValue {
        MonitorValue::Long(self.source.size() as u64)
    }
}

impl CompositeMonitor for StoreMonitor {
    fn monitors(&self) -> Vec<Arc<dyn Monitor>> {
        self.counters
            .iter()
            .map(|c| Arc::clone(c) as Arc<dyn Monitor>)
            .collect()
    }
}
