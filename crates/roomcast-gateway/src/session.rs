//! Per-connection session: handshake, receive duty, send/heartbeat duty.
//!
//! A session moves `Connecting -> Handshaking -> Active -> Closing ->
//! Closed`. After the handshake it runs two duties concurrently: the
//! receive duty (inline below) decodes inbound envelopes and hands
//! accepted chat messages to the room, the send duty (spawned) drains the
//! bounded outbound queue and keeps the heartbeat going. The duties share
//! a cancellation token; whichever ends first cancels the other, and the
//! session awaits both before tearing down.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use roomcast_core::protocol::{Envelope, Outbound};
use roomcast_core::{token, RelayError, Result};

use crate::config::GatewaySection;
use crate::room::{Peer, Room, SessionId};

/// Timer and limit knobs resolved from the gateway config section.
#[derive(Debug, Clone)]
pub struct SessionCfg {
    pub ping_interval: Duration,
    pub pong_timeout: Duration,
    pub write_timeout: Duration,
    pub max_frame_bytes: usize,
    pub send_queue_capacity: usize,
}

impl From<&GatewaySection> for SessionCfg {
    fn from(gw: &GatewaySection) -> Self {
        Self {
            ping_interval: Duration::from_millis(gw.ping_interval_ms),
            pong_timeout: Duration::from_millis(gw.pong_timeout_ms),
            write_timeout: Duration::from_millis(gw.write_timeout_ms),
            max_frame_bytes: gw.max_frame_bytes,
            send_queue_capacity: gw.send_queue_capacity,
        }
    }
}

/// Membership handle held while the session is registered with its room.
struct Registered {
    id: SessionId,
    name: String,
}

/// Run one connection to completion. Blocks until the session is closed.
pub async fn run(socket: WebSocket, room: Arc<Room>, cfg: SessionCfg, shutdown: CancellationToken) {
    let (out_tx, out_rx) = mpsc::channel::<Message>(cfg.send_queue_capacity);
    let (ws_tx, ws_rx) = socket.split();
    let cancel = shutdown.child_token();

    let writer = tokio::spawn(send_duty(ws_tx, out_rx, cfg.clone(), cancel.clone()));

    let registered = receive_duty(ws_rx, &room, &out_tx, &cfg, cancel).await;

    // Closing: a handshake failure never registered, so there is nothing
    // to announce in that case.
    if let Some(reg) = registered {
        room.unregister(reg.id);
        room.broadcast_system(format!("{} left", reg.name));
    }

    drop(out_tx);
    let _ = writer.await;
    // Socket halves drop here; closing the underlying stream is idempotent.
}

/// Receive duty: one handshake envelope, then chat messages until the
/// transport fails, the peer closes, or the read deadline lapses.
/// Returns the membership handle if the session ever registered.
async fn receive_duty(
    mut ws_rx: SplitStream<WebSocket>,
    room: &Room,
    out_tx: &mpsc::Sender<Message>,
    cfg: &SessionCfg,
    cancel: CancellationToken,
) -> Option<Registered> {
    let _guard = cancel.clone().drop_guard();

    let name = match handshake(&mut ws_rx, room, cfg, &cancel).await {
        Ok(Some(name)) => name,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(room = %room.id(), err = %e, "handshake failed");
            // Best effort, and only for rejections; transport failures
            // mean the channel is presumed unusable.
            if e.is_reportable() {
                enqueue(out_tx, &Envelope::error(&e));
            }
            return None;
        }
    };

    let issued = token::derive(room.id(), &name, room.salt());
    enqueue(out_tx, &Envelope::token_issued(issued, room.id()));

    let id = room.register(Peer {
        name: name.clone(),
        tx: out_tx.clone(),
    });
    room.broadcast_system(format!("{name} joined"));
    let reg = Registered { id, name };

    loop {
        let env = match next_envelope(&mut ws_rx, cfg.pong_timeout, &cancel).await {
            Ok(Some(env)) => env,
            Ok(None) => {
                tracing::info!(room = %room.id(), name = %reg.name, "client disconnected");
                break;
            }
            // A recognizable frame of an unknown kind is a rejection,
            // not a dead transport: tell the peer and keep reading.
            Err(e) if e.is_reportable() => {
                enqueue(out_tx, &Envelope::error(&e));
                continue;
            }
            Err(e) => {
                tracing::warn!(room = %room.id(), name = %reg.name, err = %e, "read error");
                break;
            }
        };

        // Everything validate_chat can reject is recoverable: report it
        // and stay active, the peer may resend.
        match validate_chat(&env, &reg.name, room.id(), room.salt()) {
            Ok(body) => room.broadcast(Outbound::chat(reg.name.clone(), body), Some(reg.id)),
            Err(e) => enqueue(out_tx, &Envelope::error(&e)),
        }
    }

    Some(reg)
}

/// Read exactly one envelope and require a valid join for this room.
async fn handshake(
    ws_rx: &mut SplitStream<WebSocket>,
    room: &Room,
    cfg: &SessionCfg,
    cancel: &CancellationToken,
) -> Result<Option<String>> {
    let env = match next_envelope(ws_rx, cfg.pong_timeout, cancel).await {
        Ok(Some(env)) => env,
        Ok(None) => return Ok(None),
        // An unparseable or unrecognized first frame is still a
        // handshake rejection, so the peer hears why it was refused.
        Err(RelayError::Decode(detail)) => return Err(RelayError::JoinDecode(detail)),
        Err(RelayError::UnsupportedKind(_)) => return Err(RelayError::ExpectedJoin),
        Err(e) => return Err(e),
    };
    validate_join(&env, room.id()).map(Some)
}

/// Pull frames until the next envelope. `Ok(None)` means the peer closed
/// cleanly or the process is shutting down.
///
/// The deadline restarts on every frame, so a peer that keeps answering
/// heartbeat pings never times out even when idle.
async fn next_envelope(
    ws_rx: &mut SplitStream<WebSocket>,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<Option<Envelope>> {
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => return Ok(None),
            next = tokio::time::timeout(deadline, ws_rx.next()) => match next {
                Err(_) => return Err(RelayError::Transport("read deadline exceeded".into())),
                Ok(None) => return Ok(None),
                Ok(Some(Err(e))) => return Err(RelayError::Transport(e.to_string())),
                Ok(Some(Ok(msg))) => msg,
            },
        };

        match frame {
            Message::Text(raw) => return Envelope::decode(&raw).map(Some),
            // Pings are answered by the transport layer; both control
            // frames count as liveness.
            Message::Ping(_) | Message::Pong(_) => continue,
            Message::Binary(_) => {
                return Err(RelayError::Transport("binary frames are not supported".into()))
            }
            Message::Close(_) => return Ok(None),
        }
    }
}

/// Send duty: drain the outbound queue, ping on the heartbeat interval.
/// A closed queue signals intentional shutdown and is answered with a
/// close frame; any write failure ends the duty.
async fn send_duty(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut out_rx: mpsc::Receiver<Message>,
    cfg: SessionCfg,
    cancel: CancellationToken,
) {
    let _guard = cancel.clone().drop_guard();

    let mut ping_tick = tokio::time::interval(cfg.ping_interval);
    ping_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ping_tick.reset();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                // Flush whatever was queued before the cancellation, then
                // say goodbye. Anything enqueued after this point is lost.
                while let Ok(msg) = out_rx.try_recv() {
                    if write(&mut ws_tx, msg, cfg.write_timeout).await.is_err() {
                        return;
                    }
                }
                let _ = write(&mut ws_tx, Message::Close(None), cfg.write_timeout).await;
                return;
            }
            maybe_out = out_rx.recv() => match maybe_out {
                Some(msg) => {
                    if let Err(e) = write(&mut ws_tx, msg, cfg.write_timeout).await {
                        tracing::warn!(err = %e, "write error");
                        return;
                    }
                }
                None => {
                    let _ = write(&mut ws_tx, Message::Close(None), cfg.write_timeout).await;
                    return;
                }
            },
            _ = ping_tick.tick() => {
                if let Err(e) = write(&mut ws_tx, Message::Ping(Vec::new()), cfg.write_timeout).await {
                    tracing::warn!(err = %e, "ping failed");
                    return;
                }
            }
        }
    }
}

async fn write(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    msg: Message,
    deadline: Duration,
) -> Result<()> {
    match tokio::time::timeout(deadline, ws_tx.send(msg)).await {
        Err(_) => Err(RelayError::Transport("write timeout".into())),
        Ok(Err(e)) => Err(RelayError::Transport(e.to_string())),
        Ok(Ok(())) => Ok(()),
    }
}

/// Encode and enqueue one envelope on a session's own queue, dropping on
/// overflow just like broadcast fan-out does.
fn enqueue(tx: &mpsc::Sender<Message>, env: &Envelope) {
    let payload = match env.encode() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(err = %e, "failed to encode envelope");
            return;
        }
    };
    if tx.try_send(Message::Text(payload)).is_err() {
        tracing::warn!(kind = env.kind(), "dropping envelope: outbound queue unavailable");
    }
}

/// Handshake validation: the first envelope must be a join for this exact
/// room carrying a non-blank name. Returns the trimmed display name.
fn validate_join(env: &Envelope, room_id: &str) -> Result<String> {
    let Envelope::Join { room, name } = env else {
        return Err(RelayError::ExpectedJoin);
    };
    if room.trim() != room_id {
        return Err(RelayError::RoomMismatch);
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(RelayError::NameRequired);
    }
    Ok(name.to_string())
}

/// Chat validation: only `message` envelopes with a non-blank body and a
/// token that verifies against this session's bound identity are accepted.
/// Returns the trimmed body.
fn validate_chat(env: &Envelope, name: &str, room_id: &str, salt: &str) -> Result<String> {
    let Envelope::Message { token: presented, body, .. } = env else {
        return Err(RelayError::UnsupportedKind(env.kind().to_string()));
    };
    let body = body.trim();
    if body.is_empty() {
        return Err(RelayError::BodyRequired);
    }
    let presented = presented
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(RelayError::TokenRequired)?;
    if !token::verify(room_id, name, salt, presented) {
        return Err(RelayError::InvalidToken);
    }
    Ok(body.to_string())
}
