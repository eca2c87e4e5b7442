//! WebSocket endpoint
//!
//! GET /ws?token=<JWT>
//! Auth: optional JWT via query parameter (browser WebSocket cannot set
//! headers). Customers connect without one and may only join table rooms.
//!
//! Protocol:
//! - Client → Server: [`ClientMessage`] (join_staff, join_table, leave, ping)
//! - Server → Client: [`ServerMessage`] (acks, errors, lifecycle events)
//!
//! Staff rooms are re-authorized on every ping tick: an expired token, a
//! removed or deactivated operator, or a revoked store permission drops the
//! affected `staff:{store}` rooms and reports an `error` frame.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use shared::realtime::{ClientMessage, ServerMessage};
use shared::util::{now_millis, parse_loose_id};
use shared::{AppError, ErrorCode};
use tokio::time::Duration;

use super::hub::{ConnectionId, RoomKey};
use crate::auth::{CurrentOperator, authenticate};
use crate::core::AppState;
use crate::gate;
use crate::security_log;
use crate::tenant::lookup_store;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    token: Option<String>,
}

/// GET /ws
///
/// A token that is present but invalid rejects the upgrade.
pub async fn handle_ws(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let token = query.token.filter(|t| !t.is_empty());
    let operator = match token.as_deref() {
        Some(token) => Some(authenticate(&state, token).await?),
        None => None,
    };

    Ok(ws.on_upgrade(move |socket| ws_session(socket, state, token, operator)))
}

async fn ws_session(
    socket: WebSocket,
    state: AppState,
    token: Option<String>,
    operator: Option<CurrentOperator>,
) {
    let (mut sink, mut stream) = socket.split();
    let (conn, mut hub_rx) = state.hub.register();

    tracing::info!(
        conn,
        operator_id = operator.as_ref().map(|o| o.id),
        "WS connected"
    );

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if let Some(reply) = recheck_staff_rooms(&state, conn, token.as_deref()).await {
                    if send_message(&mut sink, &reply).await.is_err() {
                        break;
                    }
                }
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = hub_rx.recv() => {
                match event {
                    Some(msg) => {
                        if send_message(&mut sink, &msg).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(cmd) => handle_client_message(&state, conn, operator.as_ref(), cmd).await,
                            Err(e) => {
                                tracing::debug!(conn, error = %e, "Malformed WS message");
                                error_reply(AppError::validation("Malformed message"))
                            }
                        };
                        if send_message(&mut sink, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    state.hub.disconnect(conn);
    tracing::info!(conn, "WS disconnected");
}

/// Apply one client command for connection `conn` and build the reply
pub async fn handle_client_message(
    state: &AppState,
    conn: ConnectionId,
    operator: Option<&CurrentOperator>,
    msg: ClientMessage,
) -> ServerMessage {
    let result = match msg {
        ClientMessage::JoinStaff { store_id } => join_staff(state, conn, operator, store_id).await,
        ClientMessage::JoinTable { store_id, table_id } => {
            join_table(state, conn, store_id, table_id).await
        }
        ClientMessage::Leave { room } => leave(state, conn, &room),
        ClientMessage::Ping => Ok(ServerMessage::Pong {
            timestamp: now_millis(),
        }),
    };
    result.unwrap_or_else(error_reply)
}

async fn join_staff(
    state: &AppState,
    conn: ConnectionId,
    operator: Option<&CurrentOperator>,
    store_id: Option<Value>,
) -> Result<ServerMessage, AppError> {
    let operator = operator.ok_or_else(AppError::not_authenticated)?;
    // the session may have been revoked since the upgrade
    let operator = state
        .repo
        .find_operator(operator.id)
        .await?
        .filter(|op| op.is_active)
        .map(|op| CurrentOperator::from(&op))
        .ok_or_else(AppError::not_authenticated)?;
    let store_id = store_id
        .as_ref()
        .and_then(parse_loose_id)
        .ok_or_else(AppError::missing_tenant)?;

    let store = lookup_store(&*state.repo, store_id).await?;
    gate::authorize(&*state.repo, &operator, &store).await?;

    Ok(joined(state, conn, RoomKey::Staff { store_id }))
}

/// Re-authorize every staff room of `conn` against its session token
///
/// Rooms that no longer pass are left; the last failure is returned as the
/// `error` frame to send. `None` when nothing was dropped.
pub async fn recheck_staff_rooms(
    state: &AppState,
    conn: ConnectionId,
    token: Option<&str>,
) -> Option<ServerMessage> {
    let stores: Vec<i64> = state
        .hub
        .rooms_of(conn)
        .into_iter()
        .filter_map(|room| match room {
            RoomKey::Staff { store_id } => Some(store_id),
            RoomKey::Table { .. } => None,
        })
        .collect();
    if stores.is_empty() {
        return None;
    }

    let session = match token {
        Some(token) => authenticate(state, token).await,
        None => Err(AppError::not_authenticated()),
    };
    let operator = match session {
        Ok(operator) => operator,
        Err(err) => {
            for store_id in stores {
                state.hub.leave(conn, RoomKey::Staff { store_id });
            }
            security_log!(WARN, "ws_session_revoked", conn = conn, code = ?err.code);
            return Some(error_reply(err));
        }
    };

    let mut dropped = None;
    for store_id in stores {
        let allowed = match lookup_store(&*state.repo, store_id).await {
            Ok(store) => gate::authorize(&*state.repo, &operator, &store).await.map(|_| ()),
            Err(err) => Err(err),
        };
        if let Err(err) = allowed {
            state.hub.leave(conn, RoomKey::Staff { store_id });
            security_log!(
                WARN,
                "ws_staff_room_dropped",
                conn = conn,
                operator_id = operator.id,
                store_id = store_id
            );
            dropped = Some(error_reply(err));
        }
    }
    dropped
}

async fn join_table(
    state: &AppState,
    conn: ConnectionId,
    store_id: Option<Value>,
    table_id: Option<Value>,
) -> Result<ServerMessage, AppError> {
    let store_id = store_id
        .as_ref()
        .and_then(parse_loose_id)
        .ok_or_else(AppError::missing_tenant)?;
    let table_id = table_id
        .as_ref()
        .and_then(parse_loose_id)
        .ok_or_else(|| AppError::validation("table_id is required"))?;

    lookup_store(&*state.repo, store_id).await?;
    state
        .repo
        .find_table(store_id, table_id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound).with_detail("table_id", table_id))?;

    Ok(joined(state, conn, RoomKey::Table { store_id, table_id }))
}

fn leave(state: &AppState, conn: ConnectionId, room: &str) -> Result<ServerMessage, AppError> {
    let key = room
        .parse::<RoomKey>()
        .map_err(|_| AppError::validation("Unknown room").with_detail("room", room))?;
    state.hub.leave(conn, key);
    Ok(ServerMessage::Left {
        room: key.to_string(),
    })
}

fn joined(state: &AppState, conn: ConnectionId, room: RoomKey) -> ServerMessage {
    state.hub.join(conn, room);
    tracing::debug!(conn, room = %room, "Joined room");
    ServerMessage::Joined {
        room: room.to_string(),
    }
}

fn error_reply(err: AppError) -> ServerMessage {
    ServerMessage::Error {
        code: err.code,
        message: err.message,
    }
}

async fn send_message<S>(sink: &mut S, msg: &ServerMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
