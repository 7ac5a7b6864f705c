//! Message repository
//!
//! Messages are append-only; there is no update or delete path.

use crate::domain::entities::{ChatMessage, Message, MessageType, AI_SENDER_NAME, AI_SENDER_ROLE};
use chrono::{DateTime, Utc};
use medlink_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Row shape for the history query: message columns plus the sender join
#[derive(sqlx::FromRow)]
struct MessageWithSenderRow {
    id: Uuid,
    consultation_id: Uuid,
    sender_id: Option<Uuid>,
    content: String,
    message_type: MessageType,
    created_at: DateTime<Utc>,
    sender_name: Option<String>,
    sender_role: Option<String>,
}

impl From<MessageWithSenderRow> for ChatMessage {
    fn from(row: MessageWithSenderRow) -> Self {
        // AI rows have no sender join; surface the synthetic labels
        let (sender_name, sender_role) = match (row.sender_name, row.sender_role) {
            (Some(name), Some(role)) => (name, role),
            _ => (AI_SENDER_NAME.to_string(), AI_SENDER_ROLE.to_string()),
        };

        ChatMessage {
            id: row.id,
            consultation_id: row.consultation_id,
            sender_id: row.sender_id,
            content: row.content,
            message_type: row.message_type,
            created_at: row.created_at,
            sender_name,
            sender_role,
        }
    }
}

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new message
    pub async fn create(&self, msg: &Message) -> Result<Message> {
        let created = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (
                id, consultation_id, sender_id, content,
                message_type, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, consultation_id, sender_id, content,
                      message_type, created_at
            "#,
        )
        .bind(msg.id)
        .bind(msg.consultation_id)
        .bind(msg.sender_id)
        .bind(&msg.content)
        .bind(msg.message_type)
        .bind(msg.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// List messages for a consultation with sender display information,
    /// ordered by creation time ascending
    pub async fn list_for_consultation(
        &self,
        consultation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, MessageWithSenderRow>(
            r#"
            SELECT m.id, m.consultation_id, m.sender_id, m.content,
                   m.message_type, m.created_at,
                   u.name AS sender_name,
                   u.role::text AS sender_role
            FROM messages m
            LEFT JOIN users u ON m.sender_id = u.id
            WHERE m.consultation_id = $1
            ORDER BY m.created_at ASC, m.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(consultation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
