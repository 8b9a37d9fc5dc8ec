//! Token codec: deterministic identity fingerprint for (room, name, salt).
//!
//! This is a keyed fingerprint, not a MAC. The salt is the only shared
//! secret and never travels over the wire; collision resistance and
//! timing-safe comparison are explicitly out of scope.

/// Derive the token for a participant name in a room.
///
/// The name is trimmed and lower-cased first, so names differing only in
/// case or surrounding whitespace map to the same token. The digest is
/// rendered as lowercase hex.
pub fn derive(room_id: &str, name: &str, salt: &str) -> String {
    let normalized = format!("{room_id}{}{salt}", name.trim().to_lowercase());
    format!("{:x}", md5::compute(normalized.as_bytes()))
}

/// Check a presented token against the expected derivation.
///
/// Comparison is case-insensitive on the token string itself, to survive
/// transports or displays that change hex casing.
pub fn verify(room_id: &str, name: &str, salt: &str, token: &str) -> bool {
    derive(room_id, name, salt).eq_ignore_ascii_case(token)
}
