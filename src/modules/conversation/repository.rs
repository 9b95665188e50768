use uuid::Uuid;

use crate::{
    api::error,
    modules::conversation::{
        model::{NewConversation, UpdateConversation},
        schema::{ConversationEntity, ConversationStatus},
    },
};

#[async_trait::async_trait]
pub trait ConversationRepository {
    async fn find_by_id(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;

    /// Most recent activity first. `client_id = None` means every client.
    async fn find_all(
        &self,
        client_id: Option<&Uuid>,
        status: Option<&ConversationStatus>,
    ) -> Result<Vec<ConversationEntity>, error::SystemError>;

    async fn create(
        &self,
        conversation: &NewConversation,
    ) -> Result<ConversationEntity, error::SystemError>;

    async fn update(
        &self,
        conversation_id: &Uuid,
        changes: &UpdateConversation,
    ) -> Result<Option<ConversationEntity>, error::SystemError>;
}
