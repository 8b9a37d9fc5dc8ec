//! Shared application state for the roomcast gateway.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::GatewayConfig;
use crate::room::{Room, RoomTable};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    rooms: RoomTable,
    shutdown: CancellationToken,
}

impl AppState {
    /// Build application state from a validated config.
    pub fn new(cfg: GatewayConfig) -> Self {
        let rooms = RoomTable::from_config(&cfg.rooms);
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                rooms,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    /// Look up the room a connection asked for. With no explicit id,
    /// single-room deployments fall back to their sole room.
    pub fn resolve_room(&self, id: Option<&str>) -> Option<Arc<Room>> {
        match id {
            Some(id) => self.inner.rooms.get(id.trim()),
            None => self.inner.rooms.single(),
        }
    }

    /// Process-level cancellation token; every session derives its own
    /// child scope from it.
    pub fn shutdown(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }

    /// Drive every live session toward teardown.
    pub fn trigger_shutdown(&self) {
        self.inner.shutdown.cancel();
    }
}
