use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use dyngauge_core::error::{DynGaugeError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    pub version: u32,

    #[serde(default)]
    pub dynamic_gauge: DynamicGaugeConfig,
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(DynGaugeError::UnsupportedVersion(self.version));
        }

        self.dynamic_gauge.validate()?;

        Ok(())
    }
}

/// Time unit names accepted in config and environment, case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// `amount` of this unit, or `None` on overflow.
    pub fn duration(self, amount: u64) -> Option<Duration> {
        let secs = |per: u64| amount.checked_mul(per).map(Duration::from_secs);
        match self {
            TimeUnit::Nanoseconds => Some(Duration::from_nanos(amount)),
            TimeUnit::Microseconds => Some(Duration::from_micros(amount)),
            TimeUnit::Milliseconds => Some(Duration::from_millis(amount)),
            TimeUnit::Seconds => Some(Duration::from_secs(amount)),
            TimeUnit::Minutes => secs(60),
            TimeUnit::Hours => secs(60 * 60),
            TimeUnit::Days => secs(24 * 60 * 60),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "nanoseconds",
            TimeUnit::Microseconds => "microseconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = DynGaugeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nanoseconds" => Ok(TimeUnit::Nanoseconds),
            "microseconds" => Ok(TimeUnit::Microseconds),
            "milliseconds" => Ok(TimeUnit::Milliseconds),
            "seconds" => Ok(TimeUnit::Seconds),
            "minutes" => Ok(TimeUnit::Minutes),
            "hours" => Ok(TimeUnit::Hours),
            "days" => Ok(TimeUnit::Days),
            _ => Err(DynGaugeError::Config(format!("unknown time unit: {s:?}"))),
        }
    }
}

impl TryFrom<String> for TimeUnit {
    type Error = DynGaugeError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicGaugeConfig {
    #[serde(default = "default_expiration")]
    pub expiration: u64,

    #[serde(default = "default_expiration_unit")]
    pub expiration_unit: TimeUnit,

    /// Nominal sampling interval for pollers. Not used by the registry itself.
    #[serde(default = "default_polling_interval")]
    pub polling_interval: u64,

    #[serde(default = "default_polling_interval_unit")]
    pub polling_interval_unit: TimeUnit,
}

impl Default for DynamicGaugeConfig {
    fn default() -> Self {
        Self {
            expiration: default_expiration(),
            expiration_unit: default_expiration_unit(),
            polling_interval: default_polling_interval(),
            polling_interval_unit: default_polling_interval_unit(),
        }
    }
}

impl DynamicGaugeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.expiration == 0 {
            return Err(DynGaugeError::Config(
                "dynamic_gauge.expiration must be greater than 0".into(),
            ));
        }
        if self.polling_interval == 0 {
            return Err(DynGaugeError::Config(
                "dynamic_gauge.polling_interval must be greater than 0".into(),
            ));
        }
        self.expire_after_access()?;
        self.poll_interval()?;
        Ok(())
    }

    pub fn expire_after_access(&self) -> Result<Duration> {
        self.expiration_unit.duration(self.expiration).ok_or_else(|| {
            DynGaugeError::Config(format!(
                "dynamic_gauge.expiration overflows: {} {}",
                self.expiration, self.expiration_unit
            ))
        })
    }

    pub fn poll_interval(&self) -> Result<Duration> {
        self.polling_interval_unit.duration(self.polling_interval).ok_or_else(|| {
            DynGaugeError::Config(format!(
                "dynamic_gauge.polling_interval overflows: {} {}",
                self.polling_interval, self.polling_interval_unit
            ))
        })
    }
}

fn default_expiration() -> u64 {
    15
}
fn default_expiration_unit() -> TimeUnit {
    TimeUnit::Minutes
}
fn default_polling_interval() -> u64 {
    60
}
fn default_polling_interval_unit() -> TimeUnit {
    TimeUnit::Seconds
}
