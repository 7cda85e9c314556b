//! dyngauge core: monitor identities, tags, and the shared error surface.
//!
//! This crate defines the value types every other dyngauge crate keys on. It
//! carries no concurrency or runtime dependencies so identities can be built
//! anywhere (instrumented libraries, tests, tooling) without pulling in the
//! registry.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `DynGaugeError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod id;

/// Shared result type.
pub use error::{DynGaugeError, ErrorCode, Result};
pub use id::{MonitorId, Tag, TagList};
