//! WebSocket channel for the message relay
//!
//! Connection lifecycle:
//! 1. Client opens `GET /v1/ws?token=<jwt>`; the token is validated before
//!    the upgrade completes
//! 2. Client emits `join-consultation` per thread it wants to follow;
//!    membership is checked before the connection enters the broadcast group
//! 3. Client emits `send-message`; the server answers failures with an
//!    `error` event on the originating connection only
//! 4. `new-message` events fan out to every group member

use std::collections::HashSet;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use medlink_auth::{AuthContext, AuthError};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::api::middleware::ChatState;
use crate::relay::hub::ServerEvent;
use crate::relay::send::send_user_message;

/// Outbound events buffered per connection before backpressure
const OUTBOX_CAPACITY: usize = 64;

/// Query parameters for the WebSocket upgrade
#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

/// Events a client may emit
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum ClientEvent {
    JoinConsultation {
        consultation_id: Uuid,
    },
    SendMessage {
        consultation_id: Uuid,
        content: String,
    },
}

/// WebSocket upgrade handler.
///
/// Authenticates the session token before upgrading the connection.
pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<ChatState>,
    Query(query): Query<WsAuthQuery>,
) -> Result<impl IntoResponse, AuthError> {
    let ctx = state.auth.authenticate_token(&query.token).await?;

    tracing::info!(user_id = %ctx.user.id, "WebSocket upgrade accepted");
    Ok(ws.on_upgrade(move |socket| handle_ws(socket, state, ctx)))
}

/// Main WebSocket connection handler.
///
/// Spawns a sender task for outbox→WS forwarding, then runs the receive
/// loop until the client disconnects.
async fn handle_ws(socket: WebSocket, state: ChatState, ctx: AuthContext) {
    let (ws_sink, mut ws_stream) = socket.split();
    let (tx, rx) = mpsc::channel::<ServerEvent>(OUTBOX_CAPACITY);

    // Sender task: reads from the outbox, writes to the WebSocket
    let sender_handle = tokio::spawn(async move {
        let mut sink = ws_sink;
        let mut rx = rx;
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(j) => j,
                Err(_) => continue,
            };
            if sink.send(WsMessage::Text(json.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let mut joined: HashSet<Uuid> = HashSet::new();

    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(WsMessage::Text(ref text)) => {
                match serde_json::from_str::<ClientEvent>(text) {
                    Ok(ClientEvent::JoinConsultation { consultation_id }) => {
                        handle_join(&state, &ctx, consultation_id, &mut joined, &tx).await;
                    }
                    Ok(ClientEvent::SendMessage {
                        consultation_id,
                        content,
                    }) => {
                        // Delivery back to the sender happens through the
                        // broadcast group like any other subscriber
                        if let Err(e) =
                            send_user_message(&state, &ctx, consultation_id, &content).await
                        {
                            let _ = tx
                                .send(ServerEvent::Error {
                                    message: e.to_string(),
                                })
                                .await;
                        }
                    }
                    Err(_) => {} // Malformed frames are ignored
                }
            }
            Ok(WsMessage::Close(_)) | Err(_) => break,
            _ => {} // Ping/Pong handled by the transport
        }
    }

    // Cleanup: drop the outbox (stops the sender task and any group
    // forwarders feeding it)
    drop(tx);
    let _ = sender_handle.await;

    tracing::info!(user_id = %ctx.user.id, "WebSocket disconnected");
}

/// Admit a connection to a consultation's broadcast group.
///
/// Membership (patient or assigned doctor) is validated before subscribing;
/// non-members get an `error` event and are not admitted.
async fn handle_join(
    state: &ChatState,
    ctx: &AuthContext,
    consultation_id: Uuid,
    joined: &mut HashSet<Uuid>,
    tx: &mpsc::Sender<ServerEvent>,
) {
    if joined.contains(&consultation_id) {
        return;
    }

    let consultation = match state.repos.consultations.find(consultation_id).await {
        Ok(Some(c)) => c,
        Ok(None) => {
            let _ = tx
                .send(ServerEvent::Error {
                    message: "Consultation not found".to_string(),
                })
                .await;
            return;
        }
        Err(e) => {
            tracing::error!(error = %e, consultation_id = %consultation_id, "Failed to load consultation for join");
            let _ = tx
                .send(ServerEvent::Error {
                    message: "Failed to load consultation".to_string(),
                })
                .await;
            return;
        }
    };

    if !consultation.can_access(ctx.user.id, ctx.user.role) {
        let _ = tx
            .send(ServerEvent::Error {
                message: "Access denied: user not associated with this consultation".to_string(),
            })
            .await;
        return;
    }

    joined.insert(consultation_id);

    // Forwarder task: group broadcast → this connection's outbox
    let mut group_rx = state.hub.subscribe(consultation_id);
    let outbox = tx.clone();
    tokio::spawn(async move {
        loop {
            match group_rx.recv().await {
                Ok(event) => {
                    if outbox.send(event).await.is_err() {
                        break; // Connection closed
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "WebSocket subscriber lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    tracing::debug!(
        user_id = %ctx.user.id,
        consultation_id = %consultation_id,
        "Joined consultation broadcast group"
    );
}
