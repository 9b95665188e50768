use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub content: String,
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "has_body"))]
pub struct SendMessage {
    pub conversation_id: Uuid,
    #[serde(default)]
    #[validate(length(max = 10000, message = "Message is too long"))]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 10, message = "Too many attachments"))]
    pub attachments: Vec<String>,
}

fn has_body(message: &SendMessage) -> Result<(), ValidationError> {
    if message.content.trim().is_empty() && message.attachments.is_empty() {
        return Err(ValidationError::new("empty_message")
            .with_message("Message needs content or an attachment".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MessageQuery {
    pub conversation_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}
