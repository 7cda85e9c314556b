//! Monitor model: leaf monitors report one value, composites also expose
//! a dynamic set of children.

mod gauge;
mod store_monitor;

use std::fmt;
use std::sync::Arc;

use dyngauge_core::MonitorId;

pub use gauge::DoubleGauge;
pub use store_monitor::{StatCounter, StatKind, StoreMonitor};

/// Current reading of a monitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonitorValue {
    Double(f64),
    Long(u64),
}

impl fmt::Display for MonitorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorValue::Double(v) => write!(f, "{v}"),
            MonitorValue::Long(v) => write!(f, "{v}"),
        }
    }
}

pub trait Monitor: Send + Sync + fmt::Debug {
    fn id(&self) -> &MonitorId;
    fn value(&self) -> MonitorValue;
}

pub trait CompositeMonitor: Monitor {
    /// Children at call time.
    fn monitors(&self) -> Vec<Arc<dyn Monitor>>;
}
