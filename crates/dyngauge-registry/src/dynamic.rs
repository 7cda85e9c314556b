//! Dynamic gauges keyed by identity, forgotten after a period of inactivity.
//!
//! `DynamicGauge` is built once per process and handed to whoever records
//! values. Building it registers the facade and its store diagnostics with
//! the supplied `MonitorRegistry`; it is not unregistered afterwards.
//!
//! A window much longer than the rate at which new identities appear lets
//! the store grow without bound. Size the window to the identity churn.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dyngauge_core::error::Result;
use dyngauge_core::{MonitorId, TagList};

use crate::clock::{Clock, MonotonicClock};
use crate::config::{self, DynamicGaugeConfig};
use crate::monitor::{CompositeMonitor, DoubleGauge, Monitor, MonitorValue, StoreMonitor};
use crate::registry::MonitorRegistry;
use crate::store::{ExpiringStore, ExpiringStoreBuilder, StatsSource, StoreStats};

/// Identity of the facade itself.
pub const GAUGES_ID: &str = "dynGauges";
/// Identity of the store diagnostics monitor.
pub const GAUGES_CACHE_ID: &str = "dynGaugesCache";

type GaugeFactory = Box<dyn Fn(&MonitorId) -> Result<DoubleGauge> + Send + Sync>;

#[derive(Debug)]
pub struct DynamicGauge {
    id: MonitorId,
    gauges: Arc<ExpiringStore<MonitorId, DoubleGauge>>,
    store_monitor: Arc<StoreMonitor>,
    polling_interval: Duration,
}

pub struct DynamicGaugeBuilder {
    cfg: DynamicGaugeConfig,
    clock: Arc<dyn Clock>,
    sweep_interval: Option<Duration>,
    factory: Option<GaugeFactory>,
}

impl DynamicGaugeBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn sweep_interval(mut self, every: Duration) -> Self {
        self.sweep_interval = Some(every);
        self
    }

    /// Replace the gauge factory. It runs under the store's shard lock and
    /// must not record into the facade being built.
    pub fn factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&MonitorId) -> Result<DoubleGauge> + Send + Sync + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Validate the config, build the facade, and register it (and its
    /// store monitor) with `registry`.
    pub fn build(self, registry: &dyn MonitorRegistry) -> Result<Arc<DynamicGauge>> {
        self.cfg.validate()?;
        let ttl = self.cfg.expire_after_access()?;
        let polling_interval = self.cfg.poll_interval()?;

        let mut store = ExpiringStoreBuilder::new()
            .expire_after_access(ttl)
            .clock(self.clock);
        if let Some(every) = self.sweep_interval {
            store = store.sweep_interval(every);
        }
        let gauges = Arc::new(match self.factory {
            Some(factory) => store.build(move |id: &MonitorId| factory(id)),
            None => store.build(|id: &MonitorId| Ok(DoubleGauge::new(id.clone()))),
        });

        let source: Arc<dyn StatsSource> = gauges.clone();
        let store_monitor = Arc::new(StoreMonitor::new(GAUGES_CACHE_ID, source));

        let this = Arc::new(DynamicGauge {
            id: MonitorId::of(GAUGES_ID),
            gauges,
            store_monitor: Arc::clone(&store_monitor),
            polling_interval,
        });

        registry.register(Arc::clone(&this) as Arc<dyn CompositeMonitor>);
        registry.register(store_monitor as Arc<dyn CompositeMonitor>);

        tracing::info!(
            expire_after_access = ?ttl,
            polling_interval = ?polling_interval,
            "dynamic gauge registry ready"
        );
        Ok(this)
    }
}

impl DynamicGauge {
    pub fn builder(cfg: DynamicGaugeConfig) -> DynamicGaugeBuilder {
        DynamicGaugeBuilder {
            cfg,
            clock: Arc::new(MonotonicClock),
            sweep_interval: None,
            factory: None,
        }
    }

    pub fn new(cfg: &DynamicGaugeConfig, registry: &dyn MonitorRegistry) -> Result<Arc<Self>> {
        Self::builder(cfg.clone()).build(registry)
    }

    /// Build from `DYNGAUGE_EXPIRATION` / `DYNGAUGE_EXPIRATION_UNIT`.
    pub fn from_env(registry: &dyn MonitorRegistry) -> Result<Arc<Self>> {
        let cfg = config::from_env()?;
        Self::new(&cfg, registry)
    }

    /// Overwrite the gauge for `id`, creating it on first use.
    pub fn set(&self, id: &MonitorId, value: f64) -> Result<()> {
        self.gauges.get_or_create(id)?.set(value);
        Ok(())
    }

    pub fn set_named(&self, name: &str, value: f64) -> Result<()> {
        self.set(&MonitorId::of(name), value)
    }

    pub fn set_tagged(&self, name: &str, tags: &TagList, value: f64) -> Result<()> {
        let id = MonitorId::builder(name).with_tags(tags).build();
        self.set(&id, value)
    }

    /// Live gauges at call time.
    pub fn monitors(&self) -> Vec<Arc<DoubleGauge>> {
        self.gauges.snapshot()
    }

    /// Number of live gauges.
    pub fn value(&self) -> u64 {
        self.gauges.size() as u64
    }

    pub fn id(&self) -> &MonitorId {
        &self.id
    }

    pub fn store_monitor(&self) -> Arc<StoreMonitor> {
        Arc::clone(&self.store_monitor)
    }

    pub fn stats(&self) -> StoreStats {
        self.gauges.stats()
    }

    pub fn expire_after_access(&self) -> Duration {
        self.gauges.expire_after_access()
    }

    /// Nominal sampling interval for pollers of this registry.
    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }
}

impl Monitor for DynamicGauge {
    fn id(&self) -> &MonitorId {
        &self.id
    }

    fn value(&self) -> MonitorValue {
        MonitorValue::Long(DynamicGauge::value(self))
    }
}

impl CompositeMonitor for DynamicGauge {
    fn monitors(&self) -> Vec<Arc<dyn Monitor>> {
        DynamicGauge::monitors(self)
            .into_iter()
            .map(|g| g as Arc<dyn Monitor>)
            .collect()
    }
}

impl fmt::Display for DynamicGauge {
    /// `DynamicGauge{id=.., totalGauges=N, gauges={id=value, ...}}`, entries
    /// sorted by rendered identity.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(String, f64)> = self
            .monitors()
            .iter()
            .map(|g| (g.id().to_string(), g.value()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        write!(f, "DynamicGauge{{id={}, totalGauges={}, gauges={{", self.id, entries.len())?;
        for (i, (id, value)) in entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}={value}")?;
        }
        f.write_str("}}")
    }
}
