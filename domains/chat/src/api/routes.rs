//! Route definitions for the Chat domain API

use axum::{routing::get, Router};

use super::handlers::messages;
use super::middleware::ChatState;
use crate::relay::ws;

/// Create message routes
fn message_routes() -> Router<ChatState> {
    Router::new().route(
        "/v1/consultations/{consultation_id}/messages",
        get(messages::list_messages).post(messages::send_message),
    )
}

/// Create the real-time channel route
fn ws_routes() -> Router<ChatState> {
    Router::new().route("/v1/ws", get(ws::ws_upgrade))
}

/// Create all Chat domain API routes
pub fn routes() -> Router<ChatState> {
    Router::new().merge(message_routes()).merge(ws_routes())
}
