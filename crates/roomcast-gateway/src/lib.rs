//! roomcast gateway library entry.
//!
//! This crate wires the config, room registry, per-session state machine,
//! and WebSocket transport into the relay server. It is intended to be
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod room;
pub mod router;
pub mod session;
pub mod transport;
