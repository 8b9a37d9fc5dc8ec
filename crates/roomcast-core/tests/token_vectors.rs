//! Token codec vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use roomcast_core::token;

const ROOM: &str = "1234564";
const SALT: &str = "oAQF6zsVq7xg3sd6";

#[test]
fn derive_matches_known_vector() {
    let got = token::derive(ROOM, "Alice", SALT);
    assert_eq!(got, "1adbbda05794ed4157cca81666f75b47");
}

#[test]
fn derive_normalizes_case_and_whitespace() {
    let canonical = token::derive(ROOM, "alice", SALT);
    assert_eq!(token::derive(ROOM, "Alice", SALT), canonical);
    assert_eq!(token::derive(ROOM, "  ALICE  ", SALT), canonical);
    assert_eq!(token::derive(ROOM, "\talice\n", SALT), canonical);
}

#[test]
fn derive_is_lowercase_hex() {
    let t = token::derive(ROOM, "bob", SALT);
    assert_eq!(t.len(), 32);
    assert!(t.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn verify_accepts_canonical_token() {
    let t = token::derive(ROOM, "Alice", SALT);
    assert!(token::verify(ROOM, "Alice", SALT, &t));
}

#[test]
fn verify_is_case_insensitive_on_token() {
    assert!(token::verify(
        ROOM,
        "Alice",
        SALT,
        "1ADBBDA05794ED4157CCA81666F75B47"
    ));
}

#[test]
fn verify_rejects_mismatched_token() {
    assert!(!token::verify(ROOM, "Alice", SALT, "deadbeef"));
    assert!(!token::verify(ROOM, "Alice", SALT, ""));
}

#[test]
fn derive_is_sensitive_to_every_input() {
    let t = token::derive(ROOM, "alice", SALT);
    assert_ne!(token::derive("other", "alice", SALT), t);
    assert_ne!(token::derive(ROOM, "bob", SALT), t);
    assert_ne!(token::derive(ROOM, "alice", "othersalt"), t);
}
