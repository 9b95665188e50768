use actix_web::{get, patch, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::{
        conversation::{
            model::{ConversationQuery, CreateConversationModel, UpdateConversationModel},
            repository_pg::ConversationRepositoryPg,
            schema::ConversationEntity,
            service::ConversationService,
        },
        policy::Principal,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type ConversationSvc = ConversationService<ConversationRepositoryPg>;

#[get("")]
pub async fn get_conversations(
    conversation_svc: web::Data<ConversationSvc>,
    principal: Principal,
    query: ValidatedQuery<ConversationQuery>,
) -> Result<success::Success<Vec<ConversationEntity>>, error::Error> {
    let conversations = conversation_svc.list(&principal, query.0.status).await?;
    Ok(success::Success::ok(Some(conversations)))
}

#[post("")]
pub async fn create_conversation(
    conversation_svc: web::Data<ConversationSvc>,
    principal: Principal,
    body: ValidatedJson<CreateConversationModel>,
) -> Result<success::Success<ConversationEntity>, error::Error> {
    let conversation = conversation_svc.create(&principal, body.0.subject).await?;
    Ok(success::Success::created(Some(conversation)).message("Conversation created"))
}

#[get("/{conversation_id}")]
pub async fn get_conversation(
    conversation_svc: web::Data<ConversationSvc>,
    principal: Principal,
    conversation_id: web::Path<Uuid>,
) -> Result<success::Success<ConversationEntity>, error::Error> {
    let conversation = conversation_svc.get(&principal, conversation_id.into_inner()).await?;
    Ok(success::Success::ok(Some(conversation)))
}

#[patch("/{conversation_id}")]
pub async fn update_conversation(
    conversation_svc: web::Data<ConversationSvc>,
    principal: Principal,
    conversation_id: web::Path<Uuid>,
    body: ValidatedJson<UpdateConversationModel>,
) -> Result<success::Success<ConversationEntity>, error::Error> {
    let conversation = conversation_svc
        .update(&principal, conversation_id.into_inner(), body.0.into())
        .await?;
    Ok(success::Success::ok(Some(conversation)).message("Conversation updated"))
}
