//! The persist-then-broadcast send pipeline
//!
//! Shared by the HTTP send endpoint and the WebSocket `send-message` event.
//! Ordering guarantee: broadcast happens only after the message is durably
//! written, so no subscriber ever sees a message the history will not return.

use medlink_auth::AuthContext;
use medlink_common::{Error, Result};
use medlink_consultations::ConsultationStatus;
use uuid::Uuid;

use crate::api::middleware::ChatState;
use crate::domain::entities::{ChatMessage, Message};
use crate::domain::sanitize::{contains_ai_mention, sanitize_content};
use crate::relay::hub::ServerEvent;

/// Validate, persist, broadcast, and context-append one human message.
///
/// On an AI mention, the responder is spawned as a detached task: generation
/// runs concurrently with ordinary message flow and its failures never
/// surface here.
pub async fn send_user_message(
    state: &ChatState,
    ctx: &AuthContext,
    consultation_id: Uuid,
    content: &str,
) -> Result<ChatMessage> {
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

    // Messaging is only open while the consultation is active
    if consultation.status != ConsultationStatus::Active {
        return Err(Error::InvalidState(
            "Can only send messages in active consultations".to_string(),
        ));
    }

    let sanitized = sanitize_content(content);

    // Persist first; `Message::new_user` enforces the non-empty and length
    // bounds on the sanitized content
    let message = Message::new_user(consultation_id, ctx.user.id, sanitized.clone())?;
    let created = state.repos.messages.create(&message).await?;

    let chat_message = ChatMessage::with_sender(
        created,
        ctx.user.name.clone(),
        ctx.user.role.to_string(),
    );

    // Broadcast after the durable write
    state
        .hub
        .publish(consultation_id, ServerEvent::NewMessage(chat_message.clone()));

    // Context append is best-effort grounding for the AI, not a message log
    let context_line = format!("{}: {}", ctx.user.role, sanitized);
    if let Err(e) = state
        .memory
        .add_to_context(consultation_id, &context_line)
        .await
    {
        tracing::warn!(error = %e, consultation_id = %consultation_id, "Failed to append chat context");
    }

    if contains_ai_mention(&sanitized) {
        let repos = state.repos.clone();
        let memory = state.memory.clone();
        let llm = state.llm.clone();
        let hub = state.hub.clone();
        let sender_role = ctx.user.role;
        let trigger = sanitized;

        tokio::spawn(async move {
            if let Err(e) = crate::ai::responder::respond(
                repos,
                memory,
                llm,
                hub,
                consultation_id,
                trigger,
                sender_role,
            )
            .await
            {
                tracing::error!(
                    error = %e,
                    consultation_id = %consultation_id,
                    "AI responder failed"
                );
            }
        });
    }

    Ok(chat_message)
}
