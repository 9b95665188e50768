use uuid::Uuid;

use crate::api::error;

#[async_trait::async_trait]
pub trait NotificationRepository {
    async fn count_unread_messages(&self, recipient_id: &Uuid) -> Result<i64, error::SystemError>;

    /// Inquiries and ideas still in status `new`.
    async fn count_pending_submissions(&self) -> Result<(i64, i64), error::SystemError>;
}
