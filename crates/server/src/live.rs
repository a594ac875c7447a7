// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The live event channel.
//!
//! Each accepted WebSocket is registered with the notification hub under the
//! caller's identity and role, then served by two tasks:
//!
//! - a writer that drains the connection's queue onto the socket, each write
//!   bounded by the hub's delivery timeout
//! - a reader that discards client frames and notices the close
//!
//! Whichever ends first ends the other, and the connection is unregistered.
//! Events are informational only; no commands are accepted over the socket.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{
    SinkExt,
    stream::{SplitSink, StreamExt},
};
use reparto_api::AuthenticatedActor;
use reparto_live::{ConnectionId, NotificationEvent, NotificationHub};
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::AppState;
use crate::session::LiveSession;

/// Why a write to the socket failed.
#[derive(Debug)]
enum WriteFailure {
    Serialize(serde_json::Error),
    Socket(axum::Error),
    TimedOut(Duration),
}

impl std::fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(e) => write!(f, "failed to serialize event: {e}"),
            Self::Socket(e) => write!(f, "socket write failed: {e}"),
            Self::TimedOut(limit) => write!(f, "socket write exceeded {}ms", limit.as_millis()),
        }
    }
}

/// Handler for GET `/live`.
pub async fn live_events_handler(
    AxumState(state): AxumState<AppState>,
    LiveSession(session): LiveSession,
    ws: WebSocketUpgrade,
) -> Response {
    let hub: Arc<NotificationHub> = Arc::clone(&state.hub);
    ws.on_upgrade(move |socket| serve_connection(socket, hub, session))
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &NotificationEvent,
    limit: Duration,
) -> Result<(), WriteFailure> {
    let json: String = serde_json::to_string(event).map_err(WriteFailure::Serialize)?;
    match tokio::time::timeout(limit, sender.send(Message::Text(json.into()))).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(WriteFailure::Socket(e)),
        Err(_) => Err(WriteFailure::TimedOut(limit)),
    }
}

async fn serve_connection(socket: WebSocket, hub: Arc<NotificationHub>, session: AuthenticatedActor) {
    let (connection_id, events): (ConnectionId, mpsc::Receiver<NotificationEvent>) =
        match hub.register(session.user_id(), session.role()).await {
            Ok(registration) => registration,
            Err(e) => {
                warn!(error = %e, "Refusing live connection");
                return;
            }
        };
    info!(
        connection_id = %connection_id,
        actor_id = session.user_id().value(),
        role = session.role().as_str(),
        "Client connected to live event stream"
    );

    run_connection(socket, connection_id, events, hub.config().delivery_timeout).await;

    hub.unregister(connection_id).await;
    info!(connection_id = %connection_id, "Client disconnected from live event stream");
}

async fn run_connection(
    socket: WebSocket,
    connection_id: ConnectionId,
    mut events: mpsc::Receiver<NotificationEvent>,
    write_timeout: Duration,
) {
    let (mut sender, mut receiver) = socket.split();

    let connected = NotificationEvent::Connected {
        timestamp: OffsetDateTime::now_utc(),
    };
    if let Err(e) = send_event(&mut sender, &connected, write_timeout).await {
        warn!(connection_id = %connection_id, error = %e, "Failed to send connection confirmation");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Err(e) = send_event(&mut sender, &event, write_timeout).await {
                warn!(connection_id = %connection_id, error = %e, "Dropping live connection");
                break;
            }
        }
        let _ = sender.close().await;
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    debug!(connection_id = %connection_id, "Ignoring client frame");
                }
                Ok(Message::Close(_)) => {
                    debug!(connection_id = %connection_id, "Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    debug!(connection_id = %connection_id, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            debug!(connection_id = %connection_id, "Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!(connection_id = %connection_id, "Receive task completed");
            send_task.abort();
        }
    }
}
