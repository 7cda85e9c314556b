#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use dyngauge_registry::config::{self, TimeUnit};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
dynamic_gauge:
  expiration: 5
  expiraton_unit: seconds # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config_uses_defaults() {
    let ok = r#"
version: 1
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.dynamic_gauge.expiration, 15);
    assert_eq!(cfg.dynamic_gauge.expiration_unit, TimeUnit::Minutes);
    assert_eq!(cfg.dynamic_gauge.poll_interval().unwrap(), Duration::from_secs(60));
}

#[test]
fn units_are_case_insensitive() {
    let ok = r#"
version: 1
dynamic_gauge:
  expiration: 90
  expiration_unit: SECONDS
  polling_interval: 500
  polling_interval_unit: Milliseconds
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.dynamic_gauge.expire_after_access().unwrap(), Duration::from_secs(90));
    assert_eq!(cfg.dynamic_gauge.poll_interval().unwrap(), Duration::from_millis(500));
}

#[test]
fn unknown_unit_fails() {
    let bad = r#"
version: 1
dynamic_gauge:
  expiration_unit: fortnights
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn zero_expiration_fails() {
    let bad = r#"
version: 1
dynamic_gauge:
  expiration: 0
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn wrong_version_fails() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn missing_file_is_a_config_error() {
    let err = config::load_from_file("does/not/exist/dyngauge.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}
