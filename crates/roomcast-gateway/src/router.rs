//! Axum router wiring (HTTP -> WS upgrade).
//!
//! Exposes a single `/ws` route for WebSocket upgrades; any other method
//! on that path is answered with 405.

use axum::{routing::get, Router};

use crate::{app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(transport::ws::ws_upgrade))
        .with_state(state)
}
