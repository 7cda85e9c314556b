use std::sync::atomic::{AtomicU64, Ordering};

use dyngauge_core::MonitorId;

use super::{Monitor, MonitorValue};

/// Overwritable `f64` gauge. Last write wins; nothing accumulates.
#[derive(Debug)]
pub struct DoubleGauge {
    id: MonitorId,
    bits: AtomicU64,
}

impl DoubleGauge {
    pub fn new(id: MonitorId) -> Self {
        Self { id, bits: AtomicU64::new(0.0f64.to_bits()) }
    }

    /// Only the owning store's access path writes, so every write also
    /// refreshes the entry's last-access time.
    pub(crate) fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Most recently set value, `0.0` if never set.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn id(&self) -> &MonitorId {
        &self.id
    }
}

impl Monitor for DoubleGauge {
    fn id(&self) -> &MonitorId {
        &self.id
    }

    fn value(&self) -> MonitorValue {
        MonitorValue::Double(DoubleGauge::value(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites() {
        let g = DoubleGauge::new(MonitorId::of("g"));
        assert_eq!(g.value(), 0.0);
        g.set(1.0);
        g.set(2.0);
        assert_eq!(g.value(), 2.0);
        g.set(-0.5);
        assert_eq!(Monitor::value(&g), MonitorValue::Double(-0.5));
    }
}
