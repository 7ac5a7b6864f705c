//! Message API handlers
//!
//! The HTTP send path shares the relay pipeline with the WebSocket channel;
//! the history endpoint is the recovery path for events missed while
//! disconnected.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use medlink_auth::AuthUser;
use medlink_common::{Error, Pagination, Result, ValidatedJson};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::ChatState;
use crate::domain::entities::ChatMessage;
use crate::relay::send::send_user_message;

/// Request for sending a message
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Message content
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

/// List messages for a consultation
pub async fn list_messages(
    AuthUser(ctx): AuthUser,
    State(state): State<ChatState>,
    Path(consultation_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<ChatMessage>>> {
    let consultation = state
        .repos
        .consultations
        .find(consultation_id)
        .await?
        .ok_or_else(|| Error::NotFound("Consultation not found".to_string()))?;

    if !consultation.can_access(ctx.user.id, ctx.user.role) {
        return Err(Error::Forbidden(
            "You don't have access to this consultation".to_string(),
        ));
    }

    let messages = state
        .repos
        .messages
        .list_for_consultation(consultation_id, pagination.limit(), pagination.offset())
        .await?;

    Ok(Json(messages))
}

/// Send a message to a consultation
pub async fn send_message(
    AuthUser(ctx): AuthUser,
    State(state): State<ChatState>,
    Path(consultation_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    let message = send_user_message(&state, &ctx, consultation_id, &req.content).await?;

    Ok((StatusCode::CREATED, Json(message)))
}
