use std::collections::HashSet;

use serde::Deserialize;

use roomcast_core::{RelayError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub rooms: Vec<RoomConfig>,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::Config("unsupported config version".into()));
        }
        if self.rooms.is_empty() {
            return Err(RelayError::Config("rooms must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for r in &self.rooms {
            if r.id.trim().is_empty() {
                return Err(RelayError::Config("room id must not be blank".into()));
            }
            if r.salt.trim().is_empty() {
                return Err(RelayError::Config(format!(
                    "room {} salt must not be blank",
                    r.id
                )));
            }
            if !seen.insert(r.id.as_str()) {
                return Err(RelayError::Config(format!("duplicate room id {}", r.id)));
            }
        }

        self.gateway.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Heartbeat ping interval. Must stay under `pong_timeout_ms` so a
    /// healthy peer always answers a ping before its read deadline lapses.
    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    /// Read deadline: a session whose peer sends nothing (pongs included)
    /// for this long is torn down.
    #[serde(default = "default_pong_timeout_ms")]
    pub pong_timeout_ms: u64,

    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Bounded outbound queue depth per connection; overflow is dropped.
    #[serde(default = "default_send_queue_capacity")]
    pub send_queue_capacity: usize,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            pong_timeout_ms: default_pong_timeout_ms(),
            write_timeout_ms: default_write_timeout_ms(),
            max_frame_bytes: default_max_frame_bytes(),
            send_queue_capacity: default_send_queue_capacity(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=120_000).contains(&self.ping_interval_ms) {
            return Err(RelayError::Config(
                "gateway.ping_interval_ms must be between 1000 and 120000".into(),
            ));
        }
        if !(2000..=600_000).contains(&self.pong_timeout_ms) {
            return Err(RelayError::Config(
                "gateway.pong_timeout_ms must be between 2000 and 600000".into(),
            ));
        }
        if self.pong_timeout_ms <= self.ping_interval_ms {
            return Err(RelayError::Config(
                "gateway.pong_timeout_ms must be greater than ping_interval_ms".into(),
            ));
        }
        if !(1000..=60_000).contains(&self.write_timeout_ms) {
            return Err(RelayError::Config(
                "gateway.write_timeout_ms must be between 1000 and 60000".into(),
            ));
        }
        if self.max_frame_bytes < 512 {
            return Err(RelayError::Config(
                "gateway.max_frame_bytes must be at least 512".into(),
            ));
        }
        if self.send_queue_capacity == 0 {
            return Err(RelayError::Config(
                "gateway.send_queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:28080".into()
}
fn default_ping_interval_ms() -> u64 {
    // 90% of the pong timeout, matching the classic read-deadline dance.
    54_000
}
fn default_pong_timeout_ms() -> u64 {
    60_000
}
fn default_write_timeout_ms() -> u64 {
    10_000
}
fn default_max_frame_bytes() -> usize {
    8192
}
fn default_send_queue_capacity() -> usize {
    64
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomConfig {
    pub id: String,
    /// Shared secret mixed into every participant token. Never sent over
    /// the wire.
    pub salt: String,
}
