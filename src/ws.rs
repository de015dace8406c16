//! WebSocket change-feed.
//!
//! Clients subscribe to one room's event stream and re-fetch room state when
//! something changes. The poll endpoint carries the same events; this is the
//! push variant for clients that want it.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ErrorBody;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Room join code to subscribe to.
    pub room: String,
    /// Replay events with a sequence number above this before going live.
    pub after: Option<u64>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::debug!("WebSocket subscription request for room code {}", params.room);
    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

async fn handle_socket(socket: WebSocket, params: WsQuery, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let room = match state.room_by_code(&params.room).await {
        Ok(room) => room,
        Err(err) => {
            let frame = ErrorBody {
                code: err.code().to_string(),
                msg: err.to_string(),
            };
            if let Ok(json) = serde_json::to_string(&frame) {
                let _ = sender.send(Message::Text(json.into())).await;
            }
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    // Subscribe before replaying the backlog so no event falls in the gap;
    // `last_seq` filters the overlap.
    let mut rx = state.event_tx.subscribe();
    let mut last_seq = params.after.unwrap_or(0);

    for event in state.events_after(&room.id, last_seq).await {
        last_seq = event.seq;
        if let Ok(json) = serde_json::to_string(&event) {
            if sender.send(Message::Text(json.into())).await.is_err() {
                return;
            }
        }
    }

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(event) if event.room_id == room.id && event.seq > last_seq => {
                        last_seq = event.seq;
                        if let Ok(json) = serde_json::to_string(&event) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(_) => {}
                    // Lagged subscribers miss events; clients recover by polling.
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("WebSocket subscriber lagged by {} events", skipped);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    tracing::debug!("WebSocket subscription closed for room {}", room.id);
}
