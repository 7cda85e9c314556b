//! Time source for expiry decisions.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Abstraction over time to enable deterministic tests.
pub trait Clock: Send + Sync + fmt::Debug + 'static {
    /// Return the current instant.
    fn now(&self) -> Instant;
}

/// Clock implementation using `Instant::now()` for production.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only advances when instructed.
#[derive(Debug, Clone)]
pub struct PausedClock {
    inner: Arc<Mutex<Instant>>,
}

impl PausedClock {
    pub fn new(start: Instant) -> Self {
        Self { inner: Arc::new(Mutex::new(start)) }
    }

    /// Manually advance the clock by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard += delta;
    }
}

impl Default for PausedClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for PausedClock {
    fn now(&self) -> Instant {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
