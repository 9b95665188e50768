use uuid::Uuid;

use crate::{
    api::error,
    modules::inquiry::{
        model::NewSubmission,
        schema::{SubmissionEntity, SubmissionKind, SubmissionStatus},
    },
};

#[async_trait::async_trait]
pub trait SubmissionRepository {
    async fn create(
        &self,
        kind: SubmissionKind,
        submission: &NewSubmission,
    ) -> Result<SubmissionEntity, error::SystemError>;

    async fn find_by_id(
        &self,
        kind: SubmissionKind,
        id: &Uuid,
    ) -> Result<Option<SubmissionEntity>, error::SystemError>;

    /// Newest first.
    async fn find_all(
        &self,
        kind: SubmissionKind,
        status: Option<&SubmissionStatus>,
    ) -> Result<Vec<SubmissionEntity>, error::SystemError>;

    async fn update_status(
        &self,
        kind: SubmissionKind,
        id: &Uuid,
        status: SubmissionStatus,
    ) -> Result<Option<SubmissionEntity>, error::SystemError>;
}
