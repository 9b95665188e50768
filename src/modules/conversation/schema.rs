use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

use crate::modules::policy::Resource;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "conversation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Open,
    InProgress,
    Closed,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConversationEntity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub admin_id: Option<Uuid>,
    pub subject: String,
    pub status: ConversationStatus,
    pub last_activity_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ConversationEntity {
    pub fn as_resource(&self) -> Resource {
        Resource::Conversation { client_id: self.client_id, admin_id: self.admin_id }
    }

    /// The other party of a message sent by `sender_id`: the client for
    /// anyone on the agency side, the assigned admin (if any) for the client.
    pub fn counterpart_of(&self, sender_id: Uuid) -> Option<Uuid> {
        if sender_id == self.client_id {
            self.admin_id
        } else {
            Some(self.client_id)
        }
    }
}
