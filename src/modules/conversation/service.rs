use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        conversation::{
            model::{NewConversation, UpdateConversation},
            repository::ConversationRepository,
            schema::{ConversationEntity, ConversationStatus},
        },
        policy::{self, Action, Principal, Resource},
        profile::repository::ProfileRepository,
    },
};

#[derive(Clone)]
pub struct ConversationService<R>
where
    R: ConversationRepository + Send + Sync + 'static,
{
    conversation_repo: Arc<R>,
    profile_repo: Arc<dyn ProfileRepository + Send + Sync>,
}

impl<R> ConversationService<R>
where
    R: ConversationRepository + Send + Sync + 'static,
{
    pub fn with_dependencies(
        conversation_repo: Arc<R>,
        profile_repo: Arc<dyn ProfileRepository + Send + Sync>,
    ) -> Self {
        ConversationService { conversation_repo, profile_repo }
    }

    /// Admin and staff see every conversation, everyone else only the ones
    /// they are the client of.
    pub async fn list(
        &self,
        principal: &Principal,
        status: Option<ConversationStatus>,
    ) -> Result<Vec<ConversationEntity>, error::SystemError> {
        let scope = if principal.is_elevated() { None } else { Some(&principal.id) };

        let mut conversations = self.conversation_repo.find_all(scope, status.as_ref()).await?;
        conversations.retain(|c| {
            policy::authorize(Some(principal), &c.as_resource(), Action::Read).is_allowed()
        });

        Ok(conversations)
    }

    pub async fn get(
        &self,
        principal: &Principal,
        conversation_id: Uuid,
    ) -> Result<ConversationEntity, error::SystemError> {
        let conversation = self
            .conversation_repo
            .find_by_id(&conversation_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))?;

        policy::require_visible(principal, &conversation.as_resource(), Action::Read, "Conversation")?;
        Ok(conversation)
    }

    pub async fn create(
        &self,
        principal: &Principal,
        subject: String,
    ) -> Result<ConversationEntity, error::SystemError> {
        if !principal.is_client() {
            return Err(error::SystemError::forbidden("Only clients can open conversations"));
        }
        policy::require(
            principal,
            &Resource::Conversation { client_id: principal.id, admin_id: None },
            Action::Create,
        )?;

        let conversation = self
            .conversation_repo
            .create(&NewConversation {
                id: Uuid::now_v7(),
                client_id: principal.id,
                subject: subject.trim().to_string(),
            })
            .await?;

        log::info!("Conversation {} opened by {}", conversation.id, principal.id);
        Ok(conversation)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        conversation_id: Uuid,
        changes: UpdateConversation,
    ) -> Result<ConversationEntity, error::SystemError> {
        if changes.is_empty() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let conversation = self.get(principal, conversation_id).await?;
        let resource = conversation.as_resource();
        policy::require_visible(principal, &resource, Action::Update, "Conversation")?;

        if let Some(admin_id) = changes.admin_id {
            policy::require(principal, &resource, Action::Assign)?;
            if let Some(assignee) = admin_id {
                let elevated = self
                    .profile_repo
                    .find_by_id(&assignee)
                    .await?
                    .is_some_and(|p| p.role.is_elevated());
                if !elevated {
                    return Err(error::SystemError::bad_request(
                        "Assignee must be an admin or staff member",
                    ));
                }
            }
        }

        self.conversation_repo
            .update(&conversation_id, &changes)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Conversation not found"))
    }
}
