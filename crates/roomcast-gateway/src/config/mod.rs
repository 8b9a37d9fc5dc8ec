//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use roomcast_core::{RelayError, Result};

pub use schema::{GatewayConfig, GatewaySection, RoomConfig};

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| RelayError::Config(format!("read {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig =
        serde_yaml::from_str(s).map_err(|e| RelayError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
