use uuid::Uuid;

use crate::{
    api::error,
    modules::inquiry::{
        model::NewSubmission,
        repository::SubmissionRepository,
        schema::{SubmissionEntity, SubmissionKind, SubmissionStatus},
    },
};

#[derive(Clone)]
pub struct SubmissionRepositoryPg {
    pool: sqlx::PgPool,
}

impl SubmissionRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

// Table names come from `SubmissionKind::table`, never from input.
#[async_trait::async_trait]
impl SubmissionRepository for SubmissionRepositoryPg {
    async fn create(
        &self,
        kind: SubmissionKind,
        submission: &NewSubmission,
    ) -> Result<SubmissionEntity, error::SystemError> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, name, email, company, message, submitted_by, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'new')
            RETURNING *
            "#,
            kind.table()
        );

        let created = sqlx::query_as::<_, SubmissionEntity>(&sql)
            .bind(submission.id)
            .bind(&submission.name)
            .bind(&submission.email)
            .bind(&submission.company)
            .bind(&submission.message)
            .bind(submission.submitted_by)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_by_id(
        &self,
        kind: SubmissionKind,
        id: &Uuid,
    ) -> Result<Option<SubmissionEntity>, error::SystemError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", kind.table());
        let found = sqlx::query_as::<_, SubmissionEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found)
    }

    async fn find_all(
        &self,
        kind: SubmissionKind,
        status: Option<&SubmissionStatus>,
    ) -> Result<Vec<SubmissionEntity>, error::SystemError> {
        let sql = format!(
            r#"
            SELECT * FROM {}
            WHERE ($1::submission_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
            kind.table()
        );

        let list = sqlx::query_as::<_, SubmissionEntity>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(list)
    }

    async fn update_status(
        &self,
        kind: SubmissionKind,
        id: &Uuid,
        status: SubmissionStatus,
    ) -> Result<Option<SubmissionEntity>, error::SystemError> {
        let sql = format!(
            "UPDATE {} SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
            kind.table()
        );

        let updated = sqlx::query_as::<_, SubmissionEntity>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }
}
