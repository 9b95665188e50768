use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        inquiry::{
            model::{NewSubmission, SubmitModel},
            repository::SubmissionRepository,
            schema::{SubmissionEntity, SubmissionKind, SubmissionStatus},
        },
        policy::{self, Action, Principal, Resource},
    },
};

#[derive(Clone)]
pub struct SubmissionService<R>
where
    R: SubmissionRepository + Send + Sync + 'static,
{
    submission_repo: Arc<R>,
}

impl<R> SubmissionService<R>
where
    R: SubmissionRepository + Send + Sync + 'static,
{
    pub fn with_dependencies(submission_repo: Arc<R>) -> Self {
        SubmissionService { submission_repo }
    }

    /// Contact form; no principal involved.
    pub async fn submit_inquiry(&self, model: SubmitModel) -> Result<SubmissionEntity, error::SystemError> {
        let inquiry = self
            .submission_repo
            .create(SubmissionKind::Inquiry, &NewSubmission::from_model(model, None))
            .await?;

        log::info!("Inquiry {} received", inquiry.id);
        Ok(inquiry)
    }

    pub async fn submit_idea(
        &self,
        principal: &Principal,
        model: SubmitModel,
    ) -> Result<SubmissionEntity, error::SystemError> {
        policy::require(principal, &Resource::Idea { submitted_by: principal.id }, Action::Create)?;

        let idea = self
            .submission_repo
            .create(SubmissionKind::Idea, &NewSubmission::from_model(model, Some(principal.id)))
            .await?;

        log::info!("Idea {} submitted by {}", idea.id, principal.id);
        Ok(idea)
    }

    /// Inboxes are for admin and staff only.
    pub async fn list(
        &self,
        principal: &Principal,
        kind: SubmissionKind,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<SubmissionEntity>, error::SystemError> {
        policy::require(principal, &Resource::Submissions, Action::Read)?;
        self.submission_repo.find_all(kind, status.as_ref()).await
    }

    /// Ideas are also readable by whoever submitted them.
    pub async fn get(
        &self,
        principal: &Principal,
        kind: SubmissionKind,
        id: Uuid,
    ) -> Result<SubmissionEntity, error::SystemError> {
        let not_found = || error::SystemError::not_found(format!("{} not found", kind.label()));
        let submission = self.submission_repo.find_by_id(kind, &id).await?.ok_or_else(not_found)?;

        let resource = match (kind, submission.submitted_by) {
            (SubmissionKind::Idea, Some(submitted_by)) => Resource::Idea { submitted_by },
            _ => Resource::Submissions,
        };
        policy::require_visible(principal, &resource, Action::Read, kind.label())?;

        Ok(submission)
    }

    pub async fn update_status(
        &self,
        principal: &Principal,
        kind: SubmissionKind,
        id: Uuid,
        status: SubmissionStatus,
    ) -> Result<SubmissionEntity, error::SystemError> {
        policy::require(principal, &Resource::Submissions, Action::Update)?;

        let updated = self
            .submission_repo
            .update_status(kind, &id, status)
            .await?
            .ok_or_else(|| error::SystemError::not_found(format!("{} not found", kind.label())))?;

        log::info!("{} {} marked {:?} by {}", kind.label(), id, status, principal.id);
        Ok(updated)
    }
}
