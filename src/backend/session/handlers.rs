/**
 * WebSocket Handlers
 *
 * Axum glue for the session protocol: the `GET /ws` upgrade handler and the
 * conversion between axum's `Message` and the protocol's `Frame`.
 *
 * # Upgrade
 *
 * A full registry refuses the upgrade with `503` before the handshake. The
 * check is repeated inside the session because the registry can fill up
 * between the upgrade response and registration.
 *
 * # Control Frames
 *
 * Ping and pong are handled by axum/tungstenite and never reach the
 * protocol loop.
 */

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{future, SinkExt, StreamExt};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::session::frame::Frame;
use crate::backend::session::protocol::run_session;

/// Handle WebSocket upgrade (GET /ws)
///
/// # Errors
///
/// * `503 Service Unavailable` - the connection registry is full
pub async fn handle_ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<Response, BackendError> {
    if let Some(limit) = state.registry.capacity() {
        if state.registry.is_full() {
            return Err(BackendError::capacity(limit));
        }
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state)))
}

/// Drive one upgraded socket through the session protocol
pub async fn handle_socket(socket: WebSocket, state: AppState) {
    let id = Uuid::new_v4();
    tracing::info!(session = %id, "WebSocket connected");

    let (sink, stream) = socket.split();

    let inbound = stream.filter_map(|message| {
        future::ready(match message {
            Ok(message) => message_to_frame(message).map(Ok),
            Err(e) => Some(Err(e)),
        })
    });
    let outbound = sink.with(|frame: Frame| future::ready(Ok::<_, axum::Error>(frame_to_message(frame))));

    run_session(id, inbound, outbound, state).await;
}

/// Convert an axum message; control frames map to `None`
pub fn message_to_frame(message: Message) -> Option<Frame> {
    match message {
        Message::Text(text) => Some(Frame::Text(text.as_str().to_owned())),
        Message::Binary(bytes) => Some(Frame::Binary(bytes)),
        Message::Close(_) => Some(Frame::Close),
        Message::Ping(_) | Message::Pong(_) => None,
    }
}

pub fn frame_to_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text.into()),
        Frame::Binary(bytes) => Message::Binary(bytes),
        Frame::Close => Message::Close(None),
    }
}
