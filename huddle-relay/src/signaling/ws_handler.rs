use crate::room::RoomRegistry;
use crate::signaling::{SignalingService, route_client_message, route_disconnect};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientMessage, ConnectionId, RoomKey, ServerMessage};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub signaling: SignalingService,
    pub rooms: RoomRegistry,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let conn = ConnectionId::new();
    ws.on_upgrade(move |socket| handle_socket(socket, conn, state))
}

async fn handle_socket(socket: WebSocket, conn: ConnectionId, state: Arc<AppState>) {
    info!("New WebSocket connection: {}", conn);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_peer(conn, tx);
    state
        .signaling
        .send(conn, &ServerMessage::Welcome { connection_id: conn });

    // Room binding outlives the receive task: the disconnect cleanup below
    // must run no matter which half of the socket dies first.
    let joined: Arc<Mutex<Option<RoomKey>>> = Arc::new(Mutex::new(None));

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let registry = state.rooms.clone();
        let joined = joined.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => {
                            let mut joined = joined.lock().await;
                            route_client_message(&registry, conn, &mut joined, client_msg).await;
                        }
                        Err(e) => warn!("Invalid message from {}: {:?}", conn, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    let mut joined = joined.lock().await;
    route_disconnect(&state.rooms, conn, &mut joined).await;

    state.signaling.remove_peer(&conn);
    info!("WebSocket disconnected: {}", conn);
}
