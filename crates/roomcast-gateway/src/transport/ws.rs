//! WebSocket upgrade handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS (non-GET requests get 405 from the router's
//!   method filter)
//! - Resolve the target room from the query string before upgrading
//! - Cap inbound message size at the configured frame limit
//! - Run the session to completion inside a per-session tracing span

use axum::{
    extract::{ws::WebSocketUpgrade, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::Instrument;

use crate::app_state::AppState;
use crate::session::{self, SessionCfg};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Target room id. Optional when exactly one room is hosted.
    #[serde(default)]
    pub room: Option<String>,
}

pub async fn ws_upgrade(
    State(app): State<AppState>,
    ws: WebSocketUpgrade,
    Query(q): Query<WsQuery>,
) -> Response {
    let Some(room) = app.resolve_room(q.room.as_deref()) else {
        return (StatusCode::BAD_REQUEST, "unknown room").into_response();
    };

    let cfg = SessionCfg::from(&app.cfg().gateway);
    let shutdown = app.shutdown();
    let span = tracing::info_span!("session", room = %room.id());

    ws.max_message_size(cfg.max_frame_bytes)
        .on_upgrade(move |socket| {
            session::run(socket, room, cfg, shutdown).instrument(span)
        })
}
