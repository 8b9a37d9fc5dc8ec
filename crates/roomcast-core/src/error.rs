//! Shared error type across roomcast crates.

use thiserror::Error;

/// Coarse error classes driving how a failure is handled (see the session
/// loop in the gateway): handshake errors end the session before it ever
/// registers, validation errors are reported and the session stays active,
/// transport/internal errors are log-only because the channel is presumed
/// unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// First-message rejection; session terminates without registering.
    Handshake,
    /// Per-message rejection; recoverable, peer may resend.
    Validation,
    /// Read/write failure or peer close; never reported to the peer.
    Transport,
    /// Server-side fault (encode failure etc); log-only.
    Internal,
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core, gateway, and client.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("expected join message")]
    ExpectedJoin,
    #[error("unknown room id")]
    RoomMismatch,
    #[error("name is required")]
    NameRequired,
    #[error("read join envelope: {0}")]
    JoinDecode(String),
    #[error("unsupported message type {0}")]
    UnsupportedKind(String),
    #[error("message body required")]
    BodyRequired,
    #[error("token required")]
    TokenRequired,
    #[error("invalid token")]
    InvalidToken,
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl RelayError {
    /// Map the error to its handling class.
    pub fn class(&self) -> ErrorClass {
        match self {
            RelayError::ExpectedJoin
            | RelayError::RoomMismatch
            | RelayError::NameRequired
            | RelayError::JoinDecode(_) => ErrorClass::Handshake,
            RelayError::UnsupportedKind(_)
            | RelayError::BodyRequired
            | RelayError::TokenRequired
            | RelayError::InvalidToken => ErrorClass::Validation,
            RelayError::Decode(_) | RelayError::Transport(_) => ErrorClass::Transport,
            RelayError::Encode(_) | RelayError::Config(_) | RelayError::Internal(_) => {
                ErrorClass::Internal
            }
        }
    }

    /// Whether the error text may be echoed back to the peer as an
    /// `error` envelope.
    pub fn is_reportable(&self) -> bool {
        matches!(self.class(), ErrorClass::Handshake | ErrorClass::Validation)
    }
}
