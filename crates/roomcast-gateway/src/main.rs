//! roomcast gateway binary.
//!
//! - WebSocket endpoint: /ws?room=...
//! - One join handshake per connection, token issued on success
//! - Broadcast fan-out with sender exclusion and lossy backpressure
//! - Heartbeat ping + read deadline to reclaim dead peers

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use roomcast_gateway::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "roomcast.yaml".into());
    let cfg = config::load_from_file(&path).expect("config load failed");
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .expect("gateway.listen must be a valid SocketAddr");

    let state = app_state::AppState::new(cfg);
    let app = router::build_router(state.clone());

    tracing::info!(%listen, rooms = state.cfg().rooms.len(), "roomcast-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await.expect("failed to bind");

    let shutdown_state = state.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
            shutdown_state.trigger_shutdown();
        })
        .await
        .expect("server failed");
}
