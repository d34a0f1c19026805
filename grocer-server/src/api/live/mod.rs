//! Live WebSocket endpoint - per-user notification push
//!
//! GET /api/live/ws?token=<JWT>
//! Auth: access token in the query string (browser WebSockets cannot set headers)
//!
//! Server → client: [`LiveMessage`] (Ready, Notification, Unread)
//! Client → server: nothing but pongs and close

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::live::LiveMessage;
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::notification;
use crate::security_log;
use crate::utils::AppError;

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/live/ws", get(handle_live_ws))
}

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

/// GET /api/live/ws?token=<JWT>
pub async fn handle_live_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .jwt_service
        .validate_access_token(&query.token)
        .and_then(CurrentUser::try_from)
        .map_err(|e| {
            security_log!("WARN", "live_auth_failed", error = e.to_string());
            AppError::from(e)
        })?;

    Ok(ws.on_upgrade(move |socket| live_session(socket, state, user.id)))
}

async fn live_session(socket: WebSocket, state: ServerState, user_id: i64) {
    let (mut sink, mut stream) = socket.split();
    let mut connection = state.hub.register(user_id);
    tracing::info!(user_id, "Live WS connected");

    let ready = LiveMessage::Ready {
        user_id,
        unread: unread_count(&state, user_id).await,
    };

    if send_message(&mut sink, &ready).await.is_ok() {
        let mut ping_interval = tokio::time::interval(PING_INTERVAL);
        ping_interval.tick().await; // skip immediate

        loop {
            tokio::select! {
                _ = ping_interval.tick() => {
                    if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }

                pushed = connection.rx.recv() => {
                    match pushed {
                        Ok(msg) => {
                            if send_message(&mut sink, &msg).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(user_id, lagged = n, "Live subscriber lagged, resending unread count");
                            let msg = LiveMessage::Unread {
                                count: unread_count(&state, user_id).await,
                            };
                            if send_message(&mut sink, &msg).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }

                incoming = stream.next() => {
                    match incoming {
                        Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                        _ => {}
                    }
                }
            }
        }
    }

    state.hub.unregister(connection);
    tracing::info!(user_id, "Live WS disconnected");
}

async fn unread_count(state: &ServerState, user_id: i64) -> i64 {
    notification::count_unread(&state.pool, user_id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(user_id, error = %e, "Failed to count unread notifications");
            0
        })
}

async fn send_message(
    sink: &mut SplitSink<WebSocket, Message>,
    msg: &LiveMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    sink.send(Message::Text(json.into())).await
}
