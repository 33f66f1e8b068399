use crate::utils::{assert_quiet, create_registry, init_tracing, recv_delivery};
use huddle_core::{ConnectionId, RoomKey, ServerMessage, SessionDescription};
use huddle_relay::{ForwardPayload, RoomCommand};

#[tokio::test]
async fn first_joiner_waits_silently() {
    init_tracing();
    let (registry, mut rx) = create_registry();
    let room = RoomKey::for_pair("alice", "bob");
    let a = ConnectionId::new();

    registry.dispatch(&room, RoomCommand::Join { conn: a }).await;

    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn second_join_notifies_only_first_occupant() {
    init_tracing();
    let (registry, mut rx) = create_registry();
    let room = RoomKey::for_pair("alice", "bob");
    let a = ConnectionId::new();
    let b = ConnectionId::new();

    registry.dispatch(&room, RoomCommand::Join { conn: a }).await;
    registry.dispatch(&room, RoomCommand::Join { conn: b }).await;

    let (to, msg) = recv_delivery(&mut rx).await;
    assert_eq!(to, a, "the earlier occupant gets the notification");
    match msg {
        ServerMessage::UserJoined { from } => assert_eq!(from, b),
        other => panic!("expected user-joined, got {other:?}"),
    }

    // B gets nothing about A's earlier join, and A gets exactly one event.
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn rejoining_member_is_not_announced_twice() {
    init_tracing();
    let (registry, mut rx) = create_registry();
    let room = RoomKey::from("call-x-y");
    let a = ConnectionId::new();
    let b = ConnectionId::new();

    registry.dispatch(&room, RoomCommand::Join { conn: a }).await;
    registry.dispatch(&room, RoomCommand::Join { conn: b }).await;
    registry.dispatch(&room, RoomCommand::Join { conn: b }).await;

    let (to, _) = recv_delivery(&mut rx).await;
    assert_eq!(to, a);
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn signal_to_nonexistent_room_does_not_create_one() {
    init_tracing();
    let (registry, mut rx) = create_registry();
    let room = RoomKey::for_pair("alice", "bob");
    let a = ConnectionId::new();

    // Only joins may create a room; a stray offer, end-call, or disconnect
    // for an unknown key is dropped without leaving an actor behind.
    registry
        .dispatch(
            &room,
            RoomCommand::Forward {
                from: a,
                payload: ForwardPayload::Offer(SessionDescription("stray-sdp".into())),
            },
        )
        .await;
    registry.dispatch(&room, RoomCommand::EndCall { from: a }).await;
    registry
        .dispatch(&room, RoomCommand::Disconnected { conn: a })
        .await;

    assert_quiet(&mut rx).await;
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn rooms_are_isolated() {
    init_tracing();
    let (registry, mut rx) = create_registry();
    let room_ab = RoomKey::for_pair("alice", "bob");
    let room_cd = RoomKey::for_pair("carol", "dave");
    let a = ConnectionId::new();
    let c = ConnectionId::new();

    registry.dispatch(&room_ab, RoomCommand::Join { conn: a }).await;
    registry.dispatch(&room_cd, RoomCommand::Join { conn: c }).await;

    // Each room has a single occupant; neither join crosses over.
    assert_quiet(&mut rx).await;
    assert_eq!(registry.room_count(), 2);
}
