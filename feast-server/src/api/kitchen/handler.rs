//! Kitchen display websocket handler
//!
//! Each connected display registers with the broadcast hub and drains
//! its per-connection outbox onto the socket. Inbound frames are
//! ignored (the display only listens); a read error or hub close frame
//! ends the connection.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::core::ServerState;
use crate::hub::{ConnectionMessage, DisplayConnection};

/// Per-connection outbox depth
const OUTBOX_CAPACITY: usize = 32;

/// GET /api/kitchen/ws - 厨房显示连接
pub async fn ws(State(state): State<ServerState>, upgrade: WebSocketUpgrade) -> Response {
    upgrade.on_upgrade(move |socket| handle_display(socket, state))
}

async fn handle_display(socket: WebSocket, state: ServerState) {
    let connection_id = state.ids.generate();
    let (tx, mut outbox) = mpsc::channel::<ConnectionMessage>(OUTBOX_CAPACITY);

    if state
        .hub
        .register(DisplayConnection::new(connection_id, tx))
        .await
        .is_err()
    {
        return;
    }

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = outbox.recv() => match frame {
                Some(ConnectionMessage::Data(bytes)) => {
                    if sink.send(Message::Binary(bytes.into())).await.is_err() {
                        break;
                    }
                }
                Some(ConnectionMessage::Close) | None => {
                    // Hub shutdown: close frame, no unregister needed.
                    let _ = sink.send(Message::Close(None)).await;
                    return;
                }
            },

            inbound = stream.next() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    let _ = state.hub.unregister(connection_id).await;
}
