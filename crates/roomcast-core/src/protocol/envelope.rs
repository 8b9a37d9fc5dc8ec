//! Tagged JSON envelope (Text frame).
//!
//! Exactly one kind per envelope; fields not meaningful for a kind are
//! omitted on the wire. Envelopes are immutable value objects: inbound is
//! consumed, outbound is produced by the constructors below.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// Sender name stamped on room-wide notices.
pub const SYSTEM_SENDER: &str = "system";

/// Wire envelope, discriminated by the `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    /// First (and only first) client message: bind to a room under a name.
    Join { room: String, name: String },
    /// Server reply to a successful join.
    Token { token: String, room: String },
    /// Chat payload. Inbound carries `token`; outbound carries `sender`
    /// and `timestamp` stamped by the room at broadcast time.
    Message {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
        #[serde(default)]
        body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<DateTime<Utc>>,
    },
    /// Room-wide notice (joins, leaves).
    System { body: String, sender: String },
    /// Handshake or validation failure echoed to one peer.
    Error { error: String },
}

impl Envelope {
    /// Issued once, immediately after a successful join.
    pub fn token_issued(token: impl Into<String>, room: impl Into<String>) -> Self {
        Envelope::Token {
            token: token.into(),
            room: room.into(),
        }
    }

    /// Broadcast chat message, stamped with sender and timestamp.
    pub fn chat(sender: impl Into<String>, body: impl Into<String>, at: DateTime<Utc>) -> Self {
        Envelope::Message {
            token: None,
            body: body.into(),
            sender: Some(sender.into()),
            timestamp: Some(at),
        }
    }

    /// Room-wide notice with the fixed system sender.
    pub fn system(body: impl Into<String>) -> Self {
        Envelope::System {
            body: body.into(),
            sender: SYSTEM_SENDER.to_string(),
        }
    }

    /// Error report for one peer.
    pub fn error(err: &RelayError) -> Self {
        Envelope::Error {
            error: err.to_string(),
        }
    }

    /// Short kind name, for logs and error text.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Join { .. } => "join",
            Envelope::Token { .. } => "token",
            Envelope::Message { .. } => "message",
            Envelope::System { .. } => "system",
            Envelope::Error { .. } => "error",
        }
    }

    /// Serialize to the wire representation.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| RelayError::Encode(e.to_string()))
    }

    /// Parse one envelope from a text frame.
    ///
    /// A well-formed frame whose `type` tag is outside the known kinds is
    /// a protocol rejection (`UnsupportedKind`), not a broken stream;
    /// anything else that fails to parse is a `Decode` error.
    pub fn decode(raw: &str) -> Result<Self> {
        const KINDS: [&str; 5] = ["join", "token", "message", "system", "error"];

        match serde_json::from_str(raw) {
            Ok(env) => Ok(env),
            Err(e) => {
                #[derive(Deserialize)]
                struct Tag {
                    #[serde(rename = "type")]
                    kind: String,
                }
                if let Ok(tag) = serde_json::from_str::<Tag>(raw) {
                    if !KINDS.contains(&tag.kind.as_str()) {
                        return Err(RelayError::UnsupportedKind(tag.kind));
                    }
                }
                Err(RelayError::Decode(e.to_string()))
            }
        }
    }
}

/// A message handed to the room for fan-out, before the envelope is built.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub body: String,
    pub sender: String,
    pub system: bool,
}

impl Outbound {
    /// Chat message from a named participant.
    pub fn chat(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            sender: sender.into(),
            system: false,
        }
    }

    /// Room-wide notice.
    pub fn system(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            sender: SYSTEM_SENDER.to_string(),
            system: true,
        }
    }
}
