use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::conversation::repository::ConversationRepository;
use crate::modules::file_upload::{
    model::{IncomingFile, NewFile, UploadConfig},
    repository::FileRepository,
    schema::{FileEntity, FileUploadResponse},
    storage::{ObjectGrant, ObjectStorage, UrlSigner},
};
use crate::modules::policy::{self, Action, Principal};

pub struct FileUploadService<R, S>
where
    R: FileRepository + Send + Sync,
    S: ObjectStorage + Send + Sync,
{
    file_repo: Arc<R>,
    storage: Arc<S>,
    conversation_repo: Arc<dyn ConversationRepository + Send + Sync>,
    signer: UrlSigner,
    config: UploadConfig,
}

impl<R, S> FileUploadService<R, S>
where
    R: FileRepository + Send + Sync,
    S: ObjectStorage + Send + Sync,
{
    pub fn new(
        file_repo: Arc<R>,
        storage: Arc<S>,
        conversation_repo: Arc<dyn ConversationRepository + Send + Sync>,
        signer: UrlSigner,
        config: UploadConfig,
    ) -> Self {
        Self { file_repo, storage, conversation_repo, signer, config }
    }

    pub fn max_file_size(&self) -> usize {
        self.config.max_file_size
    }

    /// The declared type wins unless it is missing or the generic
    /// octet-stream, in which case it is guessed from the filename.
    pub fn resolve_mime(filename: &str, declared: Option<&str>) -> String {
        match declared.map(str::trim) {
            Some(m) if !m.is_empty() && m != "application/octet-stream" => m.to_ascii_lowercase(),
            _ => mime_guess::from_path(filename).first_or_octet_stream().essence_str().to_string(),
        }
    }

    /// Runs before anything is stored.
    pub fn validate_file(&self, file_size: usize, mime_type: &str) -> Result<(), error::SystemError> {
        if file_size == 0 {
            return Err(error::SystemError::bad_request("File is empty"));
        }

        if file_size > self.config.max_file_size {
            return Err(error::SystemError::bad_request(format!(
                "File size exceeds maximum allowed size of {} bytes",
                self.config.max_file_size
            )));
        }

        if !self.config.allowed_mime_types.iter().any(|m| m == mime_type) {
            return Err(error::SystemError::bad_request(format!(
                "File type '{}' is not allowed",
                mime_type
            )));
        }

        Ok(())
    }

    fn object_key(owner_id: &Uuid, original_filename: &str) -> String {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("");
        let id = Uuid::now_v7();
        if extension.is_empty() {
            format!("{}/{}", owner_id, id)
        } else {
            format!("{}/{}.{}", owner_id, id, extension.to_ascii_lowercase())
        }
    }

    fn respond(
        &self,
        file: FileEntity,
        expires_in: Option<u64>,
    ) -> Result<FileUploadResponse, error::SystemError> {
        let signed = self.signer.sign(&file.storage_path, &file.mime_type, expires_in)?;
        Ok(FileUploadResponse {
            id: file.id,
            conversation_id: file.conversation_id,
            original_filename: file.original_filename,
            mime_type: file.mime_type,
            file_size: file.file_size,
            url: signed.url,
            expires_at: signed.expires_at,
            created_at: file.created_at,
        })
    }

    pub async fn upload(
        &self,
        principal: &Principal,
        file: IncomingFile,
        expires_in: Option<u64>,
    ) -> Result<FileUploadResponse, error::SystemError> {
        let mime_type = Self::resolve_mime(&file.filename, file.content_type.as_deref());
        self.validate_file(file.bytes.len(), &mime_type)?;

        if let Some(conversation_id) = file.conversation_id {
            let conversation = self
                .conversation_repo
                .find_by_id(&conversation_id)
                .await?
                .ok_or_else(|| error::SystemError::not_found("Conversation not found"))?;
            policy::require_visible(principal, &conversation.as_resource(), Action::Create, "Conversation")?;
        }

        let key = Self::object_key(&principal.id, &file.filename);
        self.storage.put(&key, &file.bytes).await?;

        let new_file = NewFile {
            id: Uuid::now_v7(),
            owner_id: principal.id,
            conversation_id: file.conversation_id,
            original_filename: file.filename,
            mime_type,
            file_size: file.bytes.len() as i64,
            storage_path: key.clone(),
        };

        let entity = match self.file_repo.create(&new_file).await {
            Ok(entity) => entity,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&key).await {
                    log::warn!("Could not remove orphaned object {}: {}", key, cleanup);
                }
                return Err(e);
            }
        };

        log::info!("File {} ({} bytes) uploaded by {}", entity.id, entity.file_size, principal.id);
        self.respond(entity, expires_in)
    }

    async fn visible_file(
        &self,
        principal: &Principal,
        file_id: &Uuid,
        action: Action,
    ) -> Result<FileEntity, error::SystemError> {
        let file = self
            .file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))?;
        policy::require_visible(principal, &file.as_resource(), action, "File")?;
        Ok(file)
    }

    /// Metadata plus a freshly signed URL.
    pub async fn get(
        &self,
        principal: &Principal,
        file_id: Uuid,
        expires_in: Option<u64>,
    ) -> Result<FileUploadResponse, error::SystemError> {
        let file = self.visible_file(principal, &file_id, Action::Read).await?;
        self.respond(file, expires_in)
    }

    pub async fn delete(&self, principal: &Principal, file_id: Uuid) -> Result<(), error::SystemError> {
        let file = self.visible_file(principal, &file_id, Action::Delete).await?;

        if !self.file_repo.delete(&file.id).await? {
            return Err(error::SystemError::not_found("File not found"));
        }
        self.storage.delete(&file.storage_path).await?;

        log::info!("File {} deleted by {}", file.id, principal.id);
        Ok(())
    }

    /// Resolves a download token to the object bytes and their type.
    pub async fn read_object(&self, token: &str) -> Result<(Vec<u8>, String), error::SystemError> {
        let ObjectGrant { key, mime_type } = self.signer.verify(token)?;
        let bytes = self
            .storage
            .get(&key)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))?;
        Ok((bytes, mime_type))
    }
}
