use uuid::Uuid;

use crate::modules::message::model::InsertMessage;
use crate::{api::error, modules::message::schema::MessageEntity};

#[async_trait::async_trait]
pub trait MessageRepository {
    /// Inserts the message and bumps the conversation's `last_activity_at`
    /// in one transaction.
    async fn create(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError>;

    async fn find_by_id(&self, message_id: &Uuid)
        -> Result<Option<MessageEntity>, error::SystemError>;

    /// Oldest first.
    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;

    /// Sets `is_read` on one message addressed to `recipient_id`. Returns
    /// `None` when the message is not addressed to them.
    async fn mark_read(
        &self,
        message_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError>;

    /// Marks every unread message addressed to `recipient_id` in the
    /// conversation; returns how many flipped.
    async fn mark_conversation_read(
        &self,
        conversation_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<u64, error::SystemError>;
}
