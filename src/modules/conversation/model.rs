use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::modules::conversation::schema::ConversationStatus;
use crate::utils::double_option;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateConversationModel {
    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateConversationModel {
    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: Option<String>,
    pub status: Option<ConversationStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub admin_id: Option<Option<Uuid>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConversationQuery {
    pub status: Option<ConversationStatus>,
}

#[derive(Debug, Clone)]
pub struct NewConversation {
    pub id: Uuid,
    pub client_id: Uuid,
    pub subject: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateConversation {
    pub subject: Option<String>,
    pub status: Option<ConversationStatus>,
    pub admin_id: Option<Option<Uuid>>,
}

impl UpdateConversation {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.status.is_none() && self.admin_id.is_none()
    }
}

impl From<UpdateConversationModel> for UpdateConversation {
    fn from(model: UpdateConversationModel) -> Self {
        UpdateConversation { subject: model.subject, status: model.status, admin_id: model.admin_id }
    }
}
