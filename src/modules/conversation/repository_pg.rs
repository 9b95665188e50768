use uuid::Uuid;

use crate::{
    api::error,
    modules::conversation::{
        model::{NewConversation, UpdateConversation},
        repository::ConversationRepository,
        schema::{ConversationEntity, ConversationStatus},
    },
};

#[derive(Clone)]
pub struct ConversationRepositoryPg {
    pool: sqlx::PgPool,
}

impl ConversationRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConversationRepository for ConversationRepositoryPg {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let conversation =
            sqlx::query_as::<_, ConversationEntity>("SELECT * FROM conversations WHERE id = $1")
                .bind(conversation_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(conversation)
    }

    async fn find_all(
        &self,
        client_id: Option<&Uuid>,
        status: Option<&ConversationStatus>,
    ) -> Result<Vec<ConversationEntity>, error::SystemError> {
        // has index on (client_id, last_activity_at DESC)
        let conversations = sqlx::query_as::<_, ConversationEntity>(
            r#"
            SELECT * FROM conversations
            WHERE ($1::uuid IS NULL OR client_id = $1)
              AND ($2::conversation_status IS NULL OR status = $2)
            ORDER BY last_activity_at DESC
            "#,
        )
        .bind(client_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(conversations)
    }

    async fn create(
        &self,
        conversation: &NewConversation,
    ) -> Result<ConversationEntity, error::SystemError> {
        let created = sqlx::query_as::<_, ConversationEntity>(
            r#"
            INSERT INTO conversations (id, client_id, subject, status)
            VALUES ($1, $2, $3, 'open')
            RETURNING *
            "#,
        )
        .bind(conversation.id)
        .bind(conversation.client_id)
        .bind(&conversation.subject)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(
        &self,
        conversation_id: &Uuid,
        changes: &UpdateConversation,
    ) -> Result<Option<ConversationEntity>, error::SystemError> {
        let updated = sqlx::query_as::<_, ConversationEntity>(
            r#"
            UPDATE conversations
            SET
                subject    = COALESCE($2, subject),
                status     = COALESCE($3, status),
                admin_id   = CASE WHEN $4::boolean THEN $5 ELSE admin_id END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(conversation_id)
        .bind(&changes.subject)
        .bind(changes.status)
        .bind(changes.admin_id.is_some())
        .bind(changes.admin_id.flatten())
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }
}
