//! Room registry: live membership and broadcast fan-out.
//!
//! Membership is a plain map behind a read/write lock: register/unregister
//! take the exclusive lock, broadcast iterates a snapshot under the shared
//! lock. Fan-out encodes the envelope once and then performs non-blocking
//! enqueues, so a stalled consumer can never stall the broadcaster.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use axum::extract::ws::Message;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use roomcast_core::protocol::{Envelope, Outbound};

use crate::config::RoomConfig;

/// Process-unique id for one registered connection.
pub type SessionId = u64;

/// One member's outbound queue sender plus its display name (for logs).
#[derive(Clone)]
pub struct Peer {
    pub name: String,
    pub tx: mpsc::Sender<Message>,
}

/// A named broadcast domain. Id and salt are fixed at construction; the
/// membership set only ever holds connections that completed a valid
/// handshake for this room.
pub struct Room {
    id: String,
    salt: String,
    members: RwLock<HashMap<SessionId, Peer>>,
    next_id: AtomicU64,
}

impl Room {
    pub fn new(id: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            salt: salt.into(),
            members: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Configured identifier of the room.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Configured hashing salt.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    pub fn member_count(&self) -> usize {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Add a connection to the broadcast list. Called once per connection,
    /// after a successful handshake.
    pub fn register(&self, peer: Peer) -> SessionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        members.insert(id, peer.clone());
        tracing::info!(room = %self.id, name = %peer.name, members = members.len(), "client joined");
        id
    }

    /// Remove a connection from the broadcast list. No-op if the id was
    /// never registered.
    pub fn unregister(&self, id: SessionId) {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(peer) = members.remove(&id) {
            tracing::info!(room = %self.id, name = %peer.name, members = members.len(), "client left");
        }
    }

    /// Deliver a message to every member except the excluded sender.
    ///
    /// The envelope is encoded once per broadcast; enqueue is try_send
    /// only, so a full queue drops the frame for that member rather than
    /// blocking. Enqueue to a member that is mid-teardown lands in its
    /// draining queue or is dropped; it is never an error.
    pub fn broadcast(&self, msg: Outbound, exclude: Option<SessionId>) {
        let envelope = if msg.system {
            Envelope::system(msg.body)
        } else {
            Envelope::chat(msg.sender, msg.body, Utc::now())
        };

        let payload = match envelope.encode() {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(room = %self.id, err = %e, "failed to encode broadcast");
                return;
            }
        };

        let members = self.members.read().unwrap_or_else(PoisonError::into_inner);
        for (id, peer) in members.iter() {
            if exclude == Some(*id) {
                continue;
            }
            match peer.tx.try_send(Message::Text(payload.clone())) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(room = %self.id, name = %peer.name, "dropping message: outbound queue full");
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(room = %self.id, name = %peer.name, "dropping message: peer closing");
                }
            }
        }
    }

    /// Send a system notice to every member.
    pub fn broadcast_system(&self, body: impl Into<String>) {
        self.broadcast(Outbound::system(body), None);
    }
}

/// Process-wide table of hosted rooms, keyed by room id.
#[derive(Default)]
pub struct RoomTable {
    rooms: DashMap<String, Arc<Room>>,
}

impl RoomTable {
    pub fn from_config(rooms: &[RoomConfig]) -> Self {
        let table = DashMap::new();
        for r in rooms {
            table.insert(r.id.clone(), Arc::new(Room::new(r.id.clone(), r.salt.clone())));
        }
        Self { rooms: table }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Room>> {
        self.rooms.get(id).map(|r| Arc::clone(r.value()))
    }

    /// The sole hosted room, if exactly one is configured. Lets single-room
    /// deployments omit the `room` query parameter.
    pub fn single(&self) -> Option<Arc<Room>> {
        if self.rooms.len() != 1 {
            return None;
        }
        self.rooms.iter().next().map(|r| Arc::clone(r.value()))
    }
}
