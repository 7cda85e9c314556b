//! Monitor registry: the place composite monitors announce themselves so
//! pollers can find them.

use std::sync::Arc;

use dashmap::DashMap;
use dyngauge_core::MonitorId;

use crate::monitor::CompositeMonitor;

pub trait MonitorRegistry: Send + Sync {
    /// Register `monitor` under its id. An existing registration for the
    /// same id is replaced.
    fn register(&self, monitor: Arc<dyn CompositeMonitor>);
    fn unregister(&self, id: &MonitorId) -> Option<Arc<dyn CompositeMonitor>>;
    fn registered(&self) -> Vec<Arc<dyn CompositeMonitor>>;
    fn is_registered(&self, id: &MonitorId) -> bool;
}

/// In-process registry backed by `DashMap`.
#[derive(Default)]
pub struct DefaultMonitorRegistry {
    monitors: DashMap<MonitorId, Arc<dyn CompositeMonitor>>,
}

impl DefaultMonitorRegistry {
    pub fn new() -> Self {
        Self { monitors: DashMap::new() }
    }
}

impl MonitorRegistry for DefaultMonitorRegistry {
    fn register(&self, monitor: Arc<dyn CompositeMonitor>) {
        let id = monitor.id().clone();
        if self.monitors.insert(id.clone(), monitor).is_some() {
            tracing::warn!(%id, "monitor registered twice; previous registration replaced");
        } else {
            tracing::debug!(%id, "monitor registered");
        }
    }

    fn unregister(&self, id: &MonitorId) -> Option<Arc<dyn CompositeMonitor>> {
        self.monitors.remove(id).map(|(_, m)| m)
    }

    fn registered(&self) -> Vec<Arc<dyn CompositeMonitor>> {
        self.monitors.iter().map(|r| Arc::clone(r.value())).collect()
    }

    fn is_registered(&self, id: &MonitorId) -> bool {
        self.monitors.contains_key(id)
    }
}
