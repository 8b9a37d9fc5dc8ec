//! Room membership and fan-out behavior.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::extract::ws::Message;
use tokio::sync::mpsc;

use roomcast_core::protocol::{Envelope, Outbound, SYSTEM_SENDER};
use roomcast_gateway::room::{Peer, Room};

fn member(room: &Room, name: &str, capacity: usize) -> (u64, mpsc::Receiver<Message>) {
    let (tx, rx) = mpsc::channel(capacity);
    let id = room.register(Peer {
        name: name.into(),
        tx,
    });
    (id, rx)
}

fn decode(msg: Message) -> Envelope {
    match msg {
        Message::Text(raw) => Envelope::decode(&raw).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn broadcast_excludes_sender() {
    let room = Room::new("1234564", "salt");
    let (alice_id, mut alice_rx) = member(&room, "alice", 8);
    let (_bob_id, mut bob_rx) = member(&room, "bob", 8);

    room.broadcast(Outbound::chat("alice", "hello"), Some(alice_id));

    let env = decode(bob_rx.try_recv().expect("bob should receive a message"));
    match env {
        Envelope::Message {
            sender,
            body,
            timestamp,
            token,
        } => {
            assert_eq!(sender.as_deref(), Some("alice"));
            assert_eq!(body, "hello");
            assert!(timestamp.is_some(), "room stamps broadcast time");
            assert!(token.is_none(), "token never echoed on broadcast");
        }
        other => panic!("unexpected kind: {}", other.kind()),
    }

    assert!(bob_rx.try_recv().is_err(), "exactly one item for bob");
    assert!(alice_rx.try_recv().is_err(), "sender must be excluded");
}

#[tokio::test]
async fn broadcast_with_no_exclusion_reaches_everyone() {
    let room = Room::new("r", "salt");
    let (_a, mut a_rx) = member(&room, "alice", 8);
    let (_b, mut b_rx) = member(&room, "bob", 8);

    room.broadcast_system("alice joined");

    for rx in [&mut a_rx, &mut b_rx] {
        match decode(rx.try_recv().unwrap()) {
            Envelope::System { body, sender } => {
                assert_eq!(body, "alice joined");
                assert_eq!(sender, SYSTEM_SENDER);
            }
            other => panic!("unexpected kind: {}", other.kind()),
        }
    }
}

#[tokio::test]
async fn full_queue_drops_without_blocking() {
    let room = Room::new("r", "salt");
    let (_id, mut rx) = member(&room, "slow", 1);

    // Fill to capacity, then one more. try_send semantics mean the extra
    // frame is dropped and the call returns immediately.
    room.broadcast(Outbound::chat("alice", "first"), None);
    room.broadcast(Outbound::chat("alice", "second"), None);

    match decode(rx.try_recv().unwrap()) {
        Envelope::Message { body, .. } => assert_eq!(body, "first"),
        other => panic!("unexpected kind: {}", other.kind()),
    }
    assert!(rx.try_recv().is_err(), "overflow frame must be dropped");
}

#[tokio::test]
async fn unregistered_member_receives_nothing() {
    let room = Room::new("r", "salt");
    let (id, mut rx) = member(&room, "alice", 8);
    assert_eq!(room.member_count(), 1);

    room.unregister(id);
    assert_eq!(room.member_count(), 0);

    room.broadcast_system("notice");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn unregister_of_unknown_id_is_noop() {
    let room = Room::new("r", "salt");
    let (_id, _rx) = member(&room, "alice", 8);

    room.unregister(999);
    assert_eq!(room.member_count(), 1);
}

#[tokio::test]
async fn broadcast_to_closed_queue_is_not_an_error() {
    let room = Room::new("r", "salt");
    let (_id, rx) = member(&room, "gone", 1);
    drop(rx);

    // Member is mid-teardown: the drop is silent, other members still
    // get the message.
    let (_other, mut other_rx) = member(&room, "alive", 8);
    room.broadcast_system("still running");
    assert!(other_rx.try_recv().is_ok());
}
