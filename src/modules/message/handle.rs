use actix_web::{get, patch, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::{
        conversation::repository_pg::ConversationRepositoryPg,
        message::{
            model::{MarkReadResponse, MessageQuery, SendMessage},
            repository_pg::MessageRepositoryPg,
            schema::MessageEntity,
            service::MessageService,
        },
        policy::Principal,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type MessageSvc = MessageService<MessageRepositoryPg, ConversationRepositoryPg>;

#[get("")]
pub async fn get_messages(
    message_service: web::Data<MessageSvc>,
    principal: Principal,
    query: ValidatedQuery<MessageQuery>,
) -> Result<success::Success<Vec<MessageEntity>>, error::Error> {
    let messages = message_service.list(&principal, query.0.conversation_id).await?;
    Ok(success::Success::ok(Some(messages)))
}

#[post("")]
pub async fn send_message(
    message_service: web::Data<MessageSvc>,
    principal: Principal,
    body: ValidatedJson<SendMessage>,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let body = body.0;
    let message = message_service
        .post(&principal, body.conversation_id, body.content, body.attachments)
        .await?;
    Ok(success::Success::created(Some(message)).message("Message sent"))
}

#[patch("/{message_id}/read")]
pub async fn mark_message_read(
    message_service: web::Data<MessageSvc>,
    principal: Principal,
    message_id: web::Path<Uuid>,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let message = message_service.mark_read(&principal, message_id.into_inner()).await?;
    Ok(success::Success::ok(Some(message)))
}

#[post("/{conversation_id}/read")]
pub async fn mark_conversation_read(
    message_service: web::Data<MessageSvc>,
    principal: Principal,
    conversation_id: web::Path<Uuid>,
) -> Result<success::Success<MarkReadResponse>, error::Error> {
    let updated =
        message_service.mark_conversation_read(&principal, conversation_id.into_inner()).await?;
    Ok(success::Success::ok(Some(MarkReadResponse { updated })))
}
