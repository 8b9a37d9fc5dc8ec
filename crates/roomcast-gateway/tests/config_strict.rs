#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use roomcast_core::RelayError;
use roomcast_gateway::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "0.0.0.0:28080"
rooms:
  - id: "1234564"
    sallt: "typo-should-fail"
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, RelayError::Config(_)));
}

#[test]
fn ok_minimal_config_applies_defaults() {
    let ok = r#"
version: 1
rooms:
  - id: "1234564"
    salt: "oAQF6zsVq7xg3sd6"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.rooms[0].id, "1234564");
    assert_eq!(cfg.gateway.listen, "0.0.0.0:28080");
    assert_eq!(cfg.gateway.ping_interval_ms, 54_000);
    assert_eq!(cfg.gateway.pong_timeout_ms, 60_000);
    assert_eq!(cfg.gateway.max_frame_bytes, 8192);
    assert_eq!(cfg.gateway.send_queue_capacity, 64);
}

#[test]
fn rejects_empty_rooms() {
    let bad = r#"
version: 1
rooms: []
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn rejects_duplicate_room_ids() {
    let bad = r#"
version: 1
rooms:
  - id: "a"
    salt: "s1"
  - id: "a"
    salt: "s2"
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn rejects_blank_salt() {
    let bad = r#"
version: 1
rooms:
  - id: "a"
    salt: "   "
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn rejects_pong_timeout_not_above_ping_interval() {
    let bad = r#"
version: 1
gateway:
  ping_interval_ms: 30000
  pong_timeout_ms: 30000
rooms:
  - id: "a"
    salt: "s"
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn rejects_unsupported_version() {
    let bad = r#"
version: 2
rooms:
  - id: "a"
    salt: "s"
"#;
    assert!(config::load_from_str(bad).is_err());
}
