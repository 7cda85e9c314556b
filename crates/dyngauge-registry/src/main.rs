//! dyngauge CLI
//!
//! Reads `name value [key=value ...]` lines from stdin, records each as a
//! dynamic gauge, and prints the registry and its store stats at EOF.
//!
//! - Config: YAML file named by `DYNGAUGE_CONFIG`, otherwise
//!   `DYNGAUGE_EXPIRATION` / `DYNGAUGE_EXPIRATION_UNIT`
//! - Logging: `RUST_LOG` filter

use std::io::{self, BufRead};

use tracing_subscriber::{fmt, EnvFilter};

use dyngauge_core::error::{DynGaugeError, Result};
use dyngauge_core::{MonitorId, Tag};
use dyngauge_registry::{config, DefaultMonitorRegistry, DynamicGauge, MonitorRegistry};

fn parse_line(line: &str) -> Result<Option<(MonitorId, f64)>> {
    let mut parts = line.split_whitespace();
    let Some(name) = parts.next() else {
        return Ok(None);
    };
    if name.starts_with('#') {
        return Ok(None);
    }
    let value: f64 = parts
        .next()
        .ok_or_else(|| DynGaugeError::Config(format!("missing value for {name}")))?
        .parse()
        .map_err(|e| DynGaugeError::Config(format!("bad value for {name}: {e}")))?;

    let mut id = MonitorId::builder(name);
    for raw in parts {
        let tag: Tag = raw.parse()?;
        id = id.with_tag(tag.key(), tag.value());
    }
    Ok(Some((id.build(), value)))
}

fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let registry = DefaultMonitorRegistry::new();
    let gauges = match std::env::var("DYNGAUGE_CONFIG") {
        Ok(path) => {
            let cfg = config::load_from_file(&path).expect("config load failed");
            DynamicGauge::new(&cfg.dynamic_gauge, &registry)
        }
        Err(_) => DynamicGauge::from_env(&registry),
    }
    .expect("registry init failed");

    let stdin = io::stdin();
    for (lineno, line) in stdin.lock().lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        match parse_line(&line) {
            Ok(Some((id, value))) => {
                if let Err(e) = gauges.set(&id, value) {
                    tracing::error!(line = lineno + 1, error = %e, "set failed");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(line = lineno + 1, error = %e, "skipping malformed line"),
        }
    }

    println!("{gauges}");
    let stats = gauges.stats();
    println!("{stats:?}");
    println!("requests={} hit_rate={:.3}", stats.request_count(), stats.hit_rate());
    tracing::info!(registered = registry.registered().len(), "done");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_value_and_tags() {
        let (id, v) = parse_line("requests 5 host=a region=eu").unwrap().unwrap();
        assert_eq!(v, 5.0);
        assert_eq!(id, MonitorId::builder("requests").with_tag("region", "eu").with_tag("host", "a").build());
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert!(parse_line("   ").unwrap().is_none());
        assert!(parse_line("# requests 5").unwrap().is_none());
    }

    #[test]
    fn rejects_missing_or_bad_value_and_bad_tag() {
        assert!(parse_line("requests").is_err());
        assert!(parse_line("requests five").is_err());
        assert!(parse_line("requests 5 host").is_err());
    }
}
