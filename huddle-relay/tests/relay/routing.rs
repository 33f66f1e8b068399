use crate::utils::{assert_quiet, create_registry, init_tracing, recv_delivery};
use huddle_core::{ClientMessage, ConnectionId, RoomKey, ServerMessage, SessionDescription};
use huddle_relay::{RoomCommand, route_client_message, route_disconnect};

#[tokio::test]
async fn join_binds_connection_and_relays_offer() {
    init_tracing();
    let (registry, mut rx) = create_registry();
    let room = RoomKey::for_pair("alice", "bob");
    let a = ConnectionId::new();
    let b = ConnectionId::new();
    let mut a_room = None;
    let mut b_room = None;

    route_client_message(
        &registry,
        a,
        &mut a_room,
        ClientMessage::JoinRoom { room: room.clone() },
    )
    .await;
    route_client_message(
        &registry,
        b,
        &mut b_room,
        ClientMessage::JoinRoom { room: room.clone() },
    )
    .await;
    assert_eq!(a_room, Some(room.clone()));
    let _ = recv_delivery(&mut rx).await; // user-joined to A

    route_client_message(
        &registry,
        a,
        &mut a_room,
        ClientMessage::Offer {
            room: room.clone(),
            sdp: SessionDescription("sdp".into()),
        },
    )
    .await;

    let (to, msg) = recv_delivery(&mut rx).await;
    assert_eq!(to, b);
    assert!(matches!(msg, ServerMessage::Offer { .. }));
}

#[tokio::test]
async fn joining_a_second_room_leaves_the_first() {
    init_tracing();
    let (registry, mut rx) = create_registry();
    let first = RoomKey::from("call-first");
    let second = RoomKey::from("call-second");
    let a = ConnectionId::new();
    let b = ConnectionId::new();
    let mut a_room = None;
    let mut b_room = None;

    route_client_message(&registry, a, &mut a_room, ClientMessage::JoinRoom { room: first.clone() })
        .await;
    route_client_message(&registry, b, &mut b_room, ClientMessage::JoinRoom { room: first.clone() })
        .await;
    let _ = recv_delivery(&mut rx).await;

    // One room per connection: rebinding B evicts it from the first room,
    // so A gets the synthetic call-ended.
    route_client_message(&registry, b, &mut b_room, ClientMessage::JoinRoom { room: second.clone() })
        .await;
    assert_eq!(b_room, Some(second));

    let (to, msg) = recv_delivery(&mut rx).await;
    assert_eq!(to, a);
    assert!(matches!(msg, ServerMessage::CallEnded));
}

#[tokio::test]
async fn end_call_clears_binding_so_disconnect_is_silent() {
    init_tracing();
    let (registry, mut rx) = create_registry();
    let room = RoomKey::for_pair("alice", "bob");
    let a = ConnectionId::new();
    let b = ConnectionId::new();
    let mut a_room = None;
    let mut b_room = None;

    route_client_message(&registry, a, &mut a_room, ClientMessage::JoinRoom { room: room.clone() })
        .await;
    route_client_message(&registry, b, &mut b_room, ClientMessage::JoinRoom { room: room.clone() })
        .await;
    let _ = recv_delivery(&mut rx).await;

    route_client_message(&registry, b, &mut b_room, ClientMessage::EndCall { room: room.clone() })
        .await;
    assert_eq!(b_room, None);
    let (to, msg) = recv_delivery(&mut rx).await;
    assert_eq!(to, a);
    assert!(matches!(msg, ServerMessage::CallEnded));

    // B already hung up; its socket closing later must not produce a
    // second notification.
    route_disconnect(&registry, b, &mut b_room).await;
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn disconnect_without_room_is_a_no_op() {
    init_tracing();
    let (registry, mut rx) = create_registry();
    let a = ConnectionId::new();
    let mut a_room = None;

    route_disconnect(&registry, a, &mut a_room).await;

    assert_quiet(&mut rx).await;
    assert_eq!(registry.room_count(), 0);

    // Registry untouched; a later explicit command still works.
    let room = RoomKey::from("call-later");
    registry.dispatch(&room, RoomCommand::Join { conn: a }).await;
    assert_eq!(registry.room_count(), 1);
}
