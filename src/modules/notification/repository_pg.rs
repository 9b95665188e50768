use uuid::Uuid;

use crate::{api::error, modules::notification::repository::NotificationRepository};

#[derive(Clone)]
pub struct NotificationRepositoryPg {
    pool: sqlx::PgPool,
}

impl NotificationRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl NotificationRepository for NotificationRepositoryPg {
    async fn count_unread_messages(&self, recipient_id: &Uuid) -> Result<i64, error::SystemError> {
        // partial index messages_unread_recipient_idx
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_pending_submissions(&self) -> Result<(i64, i64), error::SystemError> {
        let counts: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM inquiries WHERE status = 'new'),
                (SELECT COUNT(*) FROM ideas WHERE status = 'new')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }
}
