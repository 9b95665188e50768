use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{model::InsertMessage, repository::MessageRepository, schema::MessageEntity},
};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn create(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        // NOW() is fixed per transaction, so the bump equals the message's created_at
        let touched = sqlx::query(
            "UPDATE conversations SET last_activity_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(message.conversation_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if touched == 0 {
            return Err(error::SystemError::not_found("Conversation not found"));
        }

        // a failed insert drops the transaction and undoes the bump
        let created = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, recipient_id, content, attachments, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING *
            "#,
        )
        .bind(message.id)
        .bind(message.conversation_id)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(&message.content)
        .bind(&message.attachments)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_id(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>("SELECT * FROM messages WHERE id = $1")
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(message)
    }

    async fn find_by_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        // has index on (conversation_id, created_at)
        let messages = sqlx::query_as::<_, MessageEntity>(
            "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn mark_read(
        &self,
        message_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>(
            "UPDATE messages SET is_read = TRUE WHERE id = $1 AND recipient_id = $2 RETURNING *",
        )
        .bind(message_id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    async fn mark_conversation_read(
        &self,
        conversation_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<u64, error::SystemError> {
        let rows = sqlx::query(
            "UPDATE messages SET is_read = TRUE WHERE conversation_id = $1 AND recipient_id = $2 AND is_read = FALSE",
        )
        .bind(conversation_id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows)
    }
}
