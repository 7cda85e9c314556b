//! Top-level facade crate for dyngauge.
//!
//! Re-exports core types and the registry library so users can depend on a single crate.

pub mod core {
    pub use dyngauge_core::*;
}

pub mod registry {
    pub use dyngauge_registry::*;
}

pub use dyngauge_core::{MonitorId, TagList};
pub use dyngauge_registry::{DefaultMonitorRegistry, DynamicGauge, MonitorRegistry};
