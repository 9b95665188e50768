use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// 10 MiB; a file of exactly this size is accepted.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: [&str; 9] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// File metadata to insert once the object is stored.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub conversation_id: Option<Uuid>,
    pub original_filename: String,
    pub mime_type: String,
    pub file_size: i64,
    pub storage_path: String,
}

/// A file as received from the client, before validation.
#[derive(Debug)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_UPLOAD_BYTES,
            allowed_mime_types: ALLOWED_MIME_TYPES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UploadQuery {
    /// Requested signed URL lifetime in seconds; clamped, never rejected.
    #[validate(range(min = 1))]
    pub expires_in: Option<u64>,
}
