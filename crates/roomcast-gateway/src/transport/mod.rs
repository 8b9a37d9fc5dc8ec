//! Transport layer: HTTP -> WebSocket upgrade.

pub mod ws;
