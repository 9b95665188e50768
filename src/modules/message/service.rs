use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::conversation::{repository::ConversationRepository, schema::ConversationEntity};
use crate::modules::message::{
    model::InsertMessage, repository::MessageRepository, schema::MessageEntity,
};
use crate::modules::policy::{self, Action, Principal};

#[derive(Clone)]
pub struct MessageService<M, C>
where
    M: MessageRepository + Send + Sync,
    C: ConversationRepository + Send + Sync,
{
    message_repo: Arc<M>,
    conversation_repo: Arc<C>,
}

impl<M, C> MessageService<M, C>
where
    M: MessageRepository + Send + Sync,
    C: ConversationRepository + Send + Sync,
{
    pub fn with_dependencies(message_repo: Arc<M>, conversation_repo: Arc<C>) -> Self {
        MessageService { message_repo, conversation_repo }
    }

    async fn conversation(&self, conversation_id: &Uuid) -> Result<ConversationEntity, error::SystemError> {
        self.conversation_repo
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))
    }

    /// Posts into a conversation. The recipient is always the sender's
    /// counterpart in that conversation.
    pub async fn post(
        &self,
        principal: &Principal,
        conversation_id: Uuid,
        content: String,
        attachments: Vec<String>,
    ) -> Result<MessageEntity, error::SystemError> {
        let conversation = self.conversation(&conversation_id).await?;
        policy::require_visible(principal, &conversation.as_resource(), Action::Create, "Conversation")?;

        let message = self
            .message_repo
            .create(&InsertMessage {
                id: Uuid::now_v7(),
                conversation_id,
                sender_id: principal.id,
                recipient_id: conversation.counterpart_of(principal.id),
                content: content.trim().to_string(),
                attachments,
            })
            .await?;

        log::info!(
            "Message {} posted to conversation {} by {}",
            message.id,
            conversation_id,
            principal.id
        );
        Ok(message)
    }

    pub async fn list(
        &self,
        principal: &Principal,
        conversation_id: Uuid,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let conversation = self.conversation(&conversation_id).await?;
        policy::require_visible(principal, &conversation.as_resource(), Action::Read, "Conversation")?;

        self.message_repo.find_by_conversation(&conversation_id).await
    }

    /// Only the recipient flips the read flag, and it never flips back.
    pub async fn mark_read(
        &self,
        principal: &Principal,
        message_id: Uuid,
    ) -> Result<MessageEntity, error::SystemError> {
        let message = self
            .message_repo
            .find_by_id(&message_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        let conversation = self.conversation(&message.conversation_id).await?;
        policy::require_visible(principal, &conversation.as_resource(), Action::Read, "Message")?;

        if message.recipient_id != Some(principal.id) {
            return Err(error::SystemError::forbidden("Only the recipient can mark a message as read"));
        }
        if message.is_read {
            return Ok(message);
        }

        self.message_repo
            .mark_read(&message_id, &principal.id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))
    }

    pub async fn mark_conversation_read(
        &self,
        principal: &Principal,
        conversation_id: Uuid,
    ) -> Result<u64, error::SystemError> {
        let conversation = self.conversation(&conversation_id).await?;
        policy::require_visible(principal, &conversation.as_resource(), Action::Read, "Conversation")?;

        self.message_repo.mark_conversation_read(&conversation_id, &principal.id).await
    }
}
