//! dyngauge registry library entry.
//!
//! This crate wires the expiring store, the monitor model, config loading,
//! and the `DynamicGauge` facade into one registry. It is intended to be
//! consumed by instrumented code, by the `dyngauge` binary, and by
//! integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod config;
pub mod dynamic;
pub mod monitor;
pub mod registry;
pub mod store;

pub use dynamic::{DynamicGauge, DynamicGaugeBuilder};
pub use registry::{DefaultMonitorRegistry, MonitorRegistry};
