//! Domain entities for the Chat domain
//!
//! A message is one chat line within exactly one consultation. Messages are
//! append-only: created by the relay (human sends) or the AI responder
//! (synthetic sends), never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use medlink_common::{Error, Result};

/// Maximum message content length
pub const MAX_CONTENT_LENGTH: usize = 5000;

/// Display name attached to broadcast AI messages
pub const AI_SENDER_NAME: &str = "AI Assistant";

/// Role label attached to broadcast AI messages
pub const AI_SENDER_ROLE: &str = "ai";

/// Message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "message_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    User,
    Ai,
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageType::User => write!(f, "user"),
            MessageType::Ai => write!(f, "ai"),
        }
    }
}

/// Message entity
///
/// Invariant: `message_type == Ai` exactly when `sender_id` is None. The two
/// constructors are the only way to build a message, so the pairing cannot
/// drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub consultation_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub content: String,
    pub message_type: MessageType,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new human-authored message
    pub fn new_user(consultation_id: Uuid, sender_id: Uuid, content: String) -> Result<Self> {
        Self::validate_content(&content)?;

        Ok(Message {
            id: Uuid::new_v4(),
            consultation_id,
            sender_id: Some(sender_id),
            content,
            message_type: MessageType::User,
            created_at: Utc::now(),
        })
    }

    /// Create a new AI-authored message
    pub fn new_ai(consultation_id: Uuid, content: String) -> Result<Self> {
        Self::validate_content(&content)?;

        Ok(Message {
            id: Uuid::new_v4(),
            consultation_id,
            sender_id: None,
            content,
            message_type: MessageType::Ai,
            created_at: Utc::now(),
        })
    }

    /// Validate message content (non-empty after trimming, bounded length)
    fn validate_content(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "Message content cannot be empty".to_string(),
            ));
        }
        if content.len() > MAX_CONTENT_LENGTH {
            return Err(Error::Validation(format!(
                "Message content exceeds maximum length of {} characters",
                MAX_CONTENT_LENGTH
            )));
        }
        Ok(())
    }
}

/// A message joined with sender display information.
///
/// This is the shape broadcast over the real-time channel, returned by the
/// history endpoint, and merged by [`crate::reconcile_messages`]. AI rows
/// carry the synthetic "AI Assistant" label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub consultation_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub content: String,
    pub message_type: MessageType,
    pub created_at: DateTime<Utc>,
    pub sender_name: String,
    pub sender_role: String,
}

impl ChatMessage {
    /// Attach sender display information to a persisted message
    pub fn with_sender(message: Message, sender_name: String, sender_role: String) -> Self {
        Self {
            id: message.id,
            consultation_id: message.consultation_id,
            sender_id: message.sender_id,
            content: message.content,
            message_type: message.message_type,
            created_at: message.created_at,
            sender_name,
            sender_role,
        }
    }

    /// Wrap an AI message with its synthetic sender labels
    pub fn from_ai_message(message: Message) -> Self {
        Self::with_sender(
            message,
            AI_SENDER_NAME.to_string(),
            AI_SENDER_ROLE.to_string(),
        )
    }
}
