//! Registry config loader (strict parsing).
//!
//! Sources, read once before the registry is built:
//! - YAML (`load_from_file` / `load_from_str`), unknown fields rejected.
//! - Process environment (`from_env`): `DYNGAUGE_EXPIRATION` and
//!   `DYNGAUGE_EXPIRATION_UNIT`. Unset means default; a malformed value is
//!   an error, never a silent fallback.

pub mod schema;

use std::fs;

use dyngauge_core::error::{DynGaugeError, Result};

pub use schema::{DynamicGaugeConfig, RegistryConfig, TimeUnit};

pub const ENV_EXPIRATION: &str = "DYNGAUGE_EXPIRATION";
pub const ENV_EXPIRATION_UNIT: &str = "DYNGAUGE_EXPIRATION_UNIT";

pub fn load_from_file(path: &str) -> Result<RegistryConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| DynGaugeError::Config(format!("read config {path:?} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<RegistryConfig> {
    let cfg: RegistryConfig = serde_yaml::from_str(s)
        .map_err(|e| DynGaugeError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn from_env() -> Result<DynamicGaugeConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Build the dynamic gauge config from a key lookup (the environment, in
/// production).
pub fn from_lookup<F>(lookup: F) -> Result<DynamicGaugeConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = DynamicGaugeConfig::default();
    if let Some(raw) = lookup(ENV_EXPIRATION) {
        cfg.expiration = raw.trim().parse().map_err(|e| {
            DynGaugeError::Config(format!("{ENV_EXPIRATION}={raw:?} is not a valid amount: {e}"))
        })?;
    }
    if let Some(raw) = lookup(ENV_EXPIRATION_UNIT) {
        cfg.expiration_unit = raw.trim().parse()?;
    }
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn env_defaults_to_fifteen_minutes() {
        let cfg = from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.expire_after_access().unwrap(), Duration::from_secs(15 * 60));
        assert_eq!(cfg.poll_interval().unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn env_overrides_amount_and_unit() {
        let cfg = from_lookup(lookup(&[(ENV_EXPIRATION, "30"), (ENV_EXPIRATION_UNIT, "SECONDS")])).unwrap();
        assert_eq!(cfg.expire_after_access().unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn env_malformed_values_fail() {
        let err = from_lookup(lookup(&[(ENV_EXPIRATION, "fifteen")])).unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIG");
        let err = from_lookup(lookup(&[(ENV_EXPIRATION_UNIT, "fortnights")])).unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIG");
        let err = from_lookup(lookup(&[(ENV_EXPIRATION, "0")])).unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIG");
    }

    #[test]
    fn overflowing_duration_fails() {
        let huge = u64::MAX.to_string();
        let err = from_lookup(lookup(&[(ENV_EXPIRATION, huge.as_str()), (ENV_EXPIRATION_UNIT, "days")]))
            .unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIG");
    }
}
