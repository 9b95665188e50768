use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Immutable after insert except for `is_read`, which only moves to `true`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageEntity {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub content: String,
    pub attachments: Vec<String>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
