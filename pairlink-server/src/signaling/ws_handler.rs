use crate::config::SupersedePolicy;
use crate::room::{ConnId, Delivery, RelayPeer, RoomManager};
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use pairlink_core::{Role, RoomId};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct RelayQuery {
    pub room: Option<String>,
    #[serde(rename = "type")]
    pub role: Option<String>,
}

struct ConnectParams {
    room_id: RoomId,
    role: Option<Role>,
}

impl RelayQuery {
    fn parse(self) -> Result<ConnectParams, &'static str> {
        let room_id = self
            .room
            .as_deref()
            .and_then(|room| RoomId::new(room).ok())
            .ok_or("Room ID required")?;

        let role = match self.role.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<Role>().map_err(|_| "Unknown client type")?),
        };

        Ok(ConnectParams { room_id, role })
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<RelayQuery>,
    State(rooms): State<RoomManager>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        match query.parse() {
            Ok(params) => handle_socket(socket, params, rooms).await,
            Err(reason) => reject(socket, reason).await,
        }
    })
}

async fn reject(mut socket: WebSocket, reason: &'static str) {
    warn!("Rejecting connection: {}", reason);
    let frame = CloseFrame {
        code: close_code::POLICY,
        reason: reason.into(),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        debug!("Failed to send rejection close frame: {}", e);
    }
}

async fn handle_socket(socket: WebSocket, params: ConnectParams, rooms: RoomManager) {
    let ConnectParams { room_id, role } = params;
    let conn_id = ConnId::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let joined = match rooms.join(&room_id, role, RelayPeer::new(conn_id, tx)) {
        Ok(joined) => joined,
        Err(e) => {
            reject(socket, "Room is full").await;
            debug!("Join of {} to room {} failed: {}", conn_id, room_id, e);
            return;
        }
    };
    let role = joined.role;

    info!("New connection {}: {} in room {}", conn_id, role, room_id);

    if let Some(old) = joined.superseded {
        match rooms.policy() {
            SupersedePolicy::Keep => {
                info!("Connection {} superseded by {}, left open", old.conn_id, conn_id);
            }
            SupersedePolicy::Close => {
                info!("Connection {} superseded by {}, closing", old.conn_id, conn_id);
                old.close(close_code::POLICY, "Superseded");
            }
        }
    }

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let rooms = rooms.clone();
        let room_id = room_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(_) | Message::Binary(_) => {
                        debug!("Relaying message in room {} from {}", room_id, role);
                        match rooms.forward(&room_id, role, conn_id, msg) {
                            Delivery::Delivered => {}
                            other => debug!("Message from {} dropped: {:?}", conn_id, other),
                        }
                    }
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

    rooms.leave(&room_id, role, conn_id);
    info!("Client {} ({}) disconnected from room {}", conn_id, role, room_id);
}
