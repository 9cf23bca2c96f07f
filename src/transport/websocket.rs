//! WebSocket join
//!
//! `GET /websocket/joinRoom/{roomId}` upgrades an authenticated request into a
//! room connection. Each connection runs two pumps:
//! - the write pump drains the connection's outbound queue onto the socket
//!   and closes the socket once the hub drops the queue (unregister or
//!   eviction);
//! - the read pump turns text frames into chat submissions until the client
//!   goes away.
//!
//! Whichever pump ends first causes the connection to be unregistered. The
//! handle makes that effective once.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message as WsMessage, WebSocket, WebSocketUpgrade, close_code};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::auth::Identity;
use crate::client::{ConnectionHandle, ConnectionId, Outbound, Registration};
use crate::config::Settings;
use crate::hub::Hub;
use crate::transport::http::Authenticated;
use crate::transport::message::parse_inbound;
use crate::utils::{HubError, Result};

/// How long the write pump may keep flushing after the read side is done.
const WRITE_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn join_room(
    Authenticated(identity): Authenticated,
    Path(room_id): Path<String>,
    State(hub): State<Hub>,
    State(settings): State<Arc<Settings>>,
    ws: WebSocketUpgrade,
) -> Result<Response> {
    if !hub.room_exists(&room_id).await? {
        return Err(HubError::RoomNotFound(room_id).into());
    }

    let max_bytes = settings.hub.max_message_bytes;
    Ok(ws
        .max_message_size(max_bytes)
        .max_frame_size(max_bytes)
        .on_upgrade(move |socket| serve_connection(socket, hub, identity, room_id))
        .into_response())
}

async fn serve_connection(mut socket: WebSocket, hub: Hub, identity: Identity, room_id: String) {
    let Registration { handle, outbound } = match hub.register(identity, &room_id).await {
        Ok(registration) => registration,
        Err(e) => {
            // The room went away between the pre-check and the upgrade.
            warn!(room = %room_id, error = %e, "register refused after upgrade");
            let frame = CloseFrame {
                code: close_code::POLICY,
                reason: e.to_string().into(),
            };
            let _ = socket.send(WsMessage::Close(Some(frame))).await;
            return;
        }
    };
    info!(
        connection = %handle.id,
        room = %room_id,
        username = %handle.identity.username,
        "connection opened"
    );

    let (sink, stream) = socket.split();
    let mut write_task = tokio::spawn(write_pump(sink, outbound, handle.id.clone()));
    let mut read_task = tokio::spawn(read_pump(stream, handle.clone()));

    let write_finished = tokio::select! {
        _ = &mut write_task => true,
        _ = &mut read_task => false,
    };
    if write_finished {
        read_task.abort();
    }

    handle.unregister().await;

    if !write_finished && tokio::time::timeout(WRITE_DRAIN_TIMEOUT, &mut write_task).await.is_err() {
        debug!(connection = %handle.id, "write pump did not drain in time");
        write_task.abort();
    }
    info!(connection = %handle.id, room = %room_id, "connection closed");
}

async fn write_pump(
    mut sink: SplitSink<WebSocket, WsMessage>,
    mut outbound: Outbound,
    id: ConnectionId,
) {
    while let Some(message) = outbound.recv().await {
        let text = match serde_json::to_string(message.as_ref()) {
            Ok(text) => text,
            Err(e) => {
                warn!(connection = %id, error = %e, "failed to encode message");
                continue;
            }
        };
        if let Err(e) = sink.send(WsMessage::Text(text.into())).await {
            debug!(connection = %id, error = %e, "write failed");
            return;
        }
    }

    // The hub dropped the queue.
    let _ = sink.close().await;
    debug!(connection = %id, "write pump stopped");
}

async fn read_pump(mut stream: SplitStream<WebSocket>, handle: ConnectionHandle) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => {
                if let Some(content) = parse_inbound(text.as_str()) {
                    handle.send(content).await;
                }
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(connection = %handle.id, error = %e, "read failed");
                break;
            }
        }
    }

    handle.unregister().await;
    debug!(connection = %handle.id, "read pump stopped");
}
