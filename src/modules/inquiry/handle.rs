use actix_web::{get, patch, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::{
        inquiry::{
            model::{SubmissionQuery, SubmitModel, UpdateSubmissionModel},
            repository_pg::SubmissionRepositoryPg,
            schema::{SubmissionEntity, SubmissionKind},
            service::SubmissionService,
        },
        policy::Principal,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type SubmissionSvc = SubmissionService<SubmissionRepositoryPg>;

#[post("/inquiries")]
pub async fn submit_inquiry(
    submission_svc: web::Data<SubmissionSvc>,
    body: ValidatedJson<SubmitModel>,
) -> Result<success::Success<SubmissionEntity>, error::Error> {
    let inquiry = submission_svc.submit_inquiry(body.0).await?;
    Ok(success::Success::created(Some(inquiry)).message("Thanks, we will get back to you"))
}

#[get("")]
pub async fn get_inquiries(
    submission_svc: web::Data<SubmissionSvc>,
    principal: Principal,
    query: ValidatedQuery<SubmissionQuery>,
) -> Result<success::Success<Vec<SubmissionEntity>>, error::Error> {
    let inquiries = submission_svc.list(&principal, SubmissionKind::Inquiry, query.0.status).await?;
    Ok(success::Success::ok(Some(inquiries)))
}

#[get("/{inquiry_id}")]
pub async fn get_inquiry(
    submission_svc: web::Data<SubmissionSvc>,
    principal: Principal,
    inquiry_id: web::Path<Uuid>,
) -> Result<success::Success<SubmissionEntity>, error::Error> {
    let inquiry =
        submission_svc.get(&principal, SubmissionKind::Inquiry, inquiry_id.into_inner()).await?;
    Ok(success::Success::ok(Some(inquiry)))
}

#[patch("/{inquiry_id}")]
pub async fn update_inquiry(
    submission_svc: web::Data<SubmissionSvc>,
    principal: Principal,
    inquiry_id: web::Path<Uuid>,
    body: ValidatedJson<UpdateSubmissionModel>,
) -> Result<success::Success<SubmissionEntity>, error::Error> {
    let inquiry = submission_svc
        .update_status(&principal, SubmissionKind::Inquiry, inquiry_id.into_inner(), body.0.status)
        .await?;
    Ok(success::Success::ok(Some(inquiry)))
}

#[get("")]
pub async fn get_ideas(
    submission_svc: web::Data<SubmissionSvc>,
    principal: Principal,
    query: ValidatedQuery<SubmissionQuery>,
) -> Result<success::Success<Vec<SubmissionEntity>>, error::Error> {
    let ideas = submission_svc.list(&principal, SubmissionKind::Idea, query.0.status).await?;
    Ok(success::Success::ok(Some(ideas)))
}

#[post("")]
pub async fn create_idea(
    submission_svc: web::Data<SubmissionSvc>,
    principal: Principal,
    body: ValidatedJson<SubmitModel>,
) -> Result<success::Success<SubmissionEntity>, error::Error> {
    let idea = submission_svc.submit_idea(&principal, body.0).await?;
    Ok(success::Success::created(Some(idea)).message("Idea submitted"))
}

#[get("/{idea_id}")]
pub async fn get_idea(
    submission_svc: web::Data<SubmissionSvc>,
    principal: Principal,
    idea_id: web::Path<Uuid>,
) -> Result<success::Success<SubmissionEntity>, error::Error> {
    let idea = submission_svc.get(&principal, SubmissionKind::Idea, idea_id.into_inner()).await?;
    Ok(success::Success::ok(Some(idea)))
}

#[patch("/{idea_id}")]
pub async fn update_idea(
    submission_svc: web::Data<SubmissionSvc>,
    principal: Principal,
    idea_id: web::Path<Uuid>,
    body: ValidatedJson<UpdateSubmissionModel>,
) -> Result<success::Success<SubmissionEntity>, error::Error> {
    let idea = submission_svc
        .update_status(&principal, SubmissionKind::Idea, idea_id.into_inner(), body.0.status)
        .await?;
    Ok(success::Success::ok(Some(idea)))
}
