use uuid::Uuid;

use crate::{
    api::error,
    modules::file_upload::{model::NewFile, repository::FileRepository, schema::FileEntity},
};

#[derive(Clone)]
pub struct FileRepositoryPg {
    pool: sqlx::PgPool,
}

impl FileRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FileRepository for FileRepositoryPg {
    async fn create(&self, file: &NewFile) -> Result<FileEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, FileEntity>(
            r#"
            INSERT INTO files (id, owner_id, conversation_id, original_filename, mime_type, file_size, storage_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_id, conversation_id, original_filename, mime_type, file_size, storage_path, created_at
            "#,
        )
        .bind(file.id)
        .bind(file.owner_id)
        .bind(file.conversation_id)
        .bind(&file.original_filename)
        .bind(&file.mime_type)
        .bind(file.file_size)
        .bind(&file.storage_path)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn find_by_id(&self, file_id: &Uuid) -> Result<Option<FileEntity>, error::SystemError> {
        let file = sqlx::query_as::<_, FileEntity>(
            r#"
            SELECT id, owner_id, conversation_id, original_filename, mime_type, file_size, storage_path, created_at
            FROM files WHERE id = $1
            "#,
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn delete(&self, file_id: &Uuid) -> Result<bool, error::SystemError> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
