//! Wire protocol: the JSON envelope exchanged over the WebSocket.
//!
//! All parsers are panic-free: malformed input is reported as `RelayError`
//! instead of panicking, keeping the gateway resilient to hostile traffic.

pub mod envelope;

pub use envelope::{Envelope, Outbound, SYSTEM_SENDER};
