//! Wire envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use chrono::{TimeZone, Utc};
use roomcast_core::protocol::{Envelope, SYSTEM_SENDER};
use roomcast_core::RelayError;

#[test]
fn decode_join() {
    let env = Envelope::decode(r#"{"type":"join","room":"1234564","name":"Alice"}"#).unwrap();
    assert_eq!(
        env,
        Envelope::Join {
            room: "1234564".into(),
            name: "Alice".into()
        }
    );
    assert_eq!(env.kind(), "join");
}

#[test]
fn decode_inbound_message_without_sender_or_timestamp() {
    let env = Envelope::decode(r#"{"type":"message","token":"abc","body":"hi"}"#).unwrap();
    match env {
        Envelope::Message {
            token,
            body,
            sender,
            timestamp,
        } => {
            assert_eq!(token.as_deref(), Some("abc"));
            assert_eq!(body, "hi");
            assert!(sender.is_none());
            assert!(timestamp.is_none());
        }
        other => panic!("unexpected kind: {}", other.kind()),
    }
}

#[test]
fn decode_unknown_kind_names_the_kind() {
    let err = Envelope::decode(r#"{"type":"shout","body":"hi"}"#).unwrap_err();
    assert!(matches!(err, RelayError::UnsupportedKind(ref k) if k == "shout"));
    assert_eq!(err.to_string(), "unsupported message type shout");
}

#[test]
fn decode_known_kind_with_missing_fields_is_a_decode_error() {
    let err = Envelope::decode(r#"{"type":"join"}"#).unwrap_err();
    assert!(matches!(err, RelayError::Decode(_)));
}

#[test]
fn decode_message_without_body_defaults_to_empty() {
    let env = Envelope::decode(r#"{"type":"message","token":"t"}"#).unwrap();
    assert!(matches!(env, Envelope::Message { ref body, .. } if body.is_empty()));
}

#[test]
fn decode_garbage_fails() {
    let err = Envelope::decode("not json").unwrap_err();
    assert!(matches!(err, RelayError::Decode(_)));
}

#[test]
fn encode_omits_absent_fields() {
    let env = Envelope::Message {
        token: Some("abc".into()),
        body: "hi".into(),
        sender: None,
        timestamp: None,
    };
    let s = env.encode().unwrap();
    assert!(s.contains(r#""type":"message""#));
    assert!(!s.contains("sender"));
    assert!(!s.contains("timestamp"));
}

#[test]
fn chat_envelope_round_trips_timestamp() {
    let at = Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap();
    let s = Envelope::chat("alice", "hello", at).encode().unwrap();
    let back = Envelope::decode(&s).unwrap();
    match back {
        Envelope::Message {
            sender, timestamp, ..
        } => {
            assert_eq!(sender.as_deref(), Some("alice"));
            assert_eq!(timestamp, Some(at));
        }
        other => panic!("unexpected kind: {}", other.kind()),
    }
}

#[test]
fn system_envelope_uses_fixed_sender() {
    let s = Envelope::system("alice joined").encode().unwrap();
    let back = Envelope::decode(&s).unwrap();
    assert_eq!(
        back,
        Envelope::System {
            body: "alice joined".into(),
            sender: SYSTEM_SENDER.into()
        }
    );
}

#[test]
fn error_envelope_carries_message_text() {
    let s = Envelope::error(&RelayError::InvalidToken).encode().unwrap();
    assert_eq!(s, r#"{"type":"error","error":"invalid token"}"#);
}
