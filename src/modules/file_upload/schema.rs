use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::modules::policy::Resource;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FileEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub original_filename: String,
    pub mime_type: String,
    pub file_size: i64,
    #[serde(skip_serializing)]
    pub storage_path: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FileEntity {
    pub fn as_resource(&self) -> Resource {
        Resource::File { owner_id: self.owner_id }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileUploadResponse {
    pub id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub original_filename: String,
    pub mime_type: String,
    pub file_size: i64,
    pub url: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
