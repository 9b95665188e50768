use actix_multipart::{Field, Multipart};
use actix_web::{delete, get, post, web, HttpResponse};
use futures_util::TryStreamExt;
use uuid::Uuid;

use crate::api::{error, success};
use crate::modules::file_upload::{
    model::{IncomingFile, UploadQuery},
    repository_pg::FileRepositoryPg,
    schema::FileUploadResponse,
    service::FileUploadService,
    storage::LocalStorage,
};
use crate::modules::policy::Principal;
use crate::utils::ValidatedQuery;

pub type FileUploadSvc = FileUploadService<FileRepositoryPg, LocalStorage>;

/// A UUID in text form never needs more than this.
const MAX_ID_PART_BYTES: usize = 64;

async fn read_part(field: &mut Field, limit: usize, too_large: &str) -> Result<Vec<u8>, error::Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))? {
        if bytes.len() + chunk.len() > limit {
            return Err(error::Error::bad_request(too_large.to_string()));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Multipart body: one part carrying a filename (the file) and an optional
/// `conversation_id` text part. Other parts are skipped unread.
async fn read_upload_form(
    mut payload: Multipart,
    max_file_size: usize,
) -> Result<IncomingFile, error::Error> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut conversation_id = None;

    while let Some(mut field) =
        payload.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
    {
        let filename = field.content_disposition().and_then(|cd| cd.get_filename()).map(str::to_string);

        match filename {
            Some(_) if file.is_some() => {
                return Err(error::Error::bad_request("Only one file per upload"))
            }
            Some(filename) => {
                let too_large =
                    format!("File size exceeds maximum allowed size of {} bytes", max_file_size);
                let bytes = read_part(&mut field, max_file_size, &too_large).await?;
                let content_type = field.content_type().map(|m| m.essence_str().to_string());
                file = Some((filename, content_type, bytes));
            }
            None if field.name() == Some("conversation_id") => {
                let raw = read_part(&mut field, MAX_ID_PART_BYTES, "Invalid conversation_id").await?;
                let id = String::from_utf8_lossy(&raw)
                    .trim()
                    .parse::<Uuid>()
                    .map_err(|_| error::Error::bad_request("Invalid conversation_id"))?;
                conversation_id = Some(id);
            }
            // the multipart reader discards unread data when moving on
            None => {}
        }
    }

    let (filename, content_type, bytes) =
        file.ok_or_else(|| error::Error::bad_request("No file found in request"))?;
    Ok(IncomingFile { filename, content_type, bytes, conversation_id })
}

#[post("/upload")]
pub async fn upload_file(
    payload: Multipart,
    principal: Principal,
    query: ValidatedQuery<UploadQuery>,
    service: web::Data<FileUploadSvc>,
) -> Result<success::Success<FileUploadResponse>, error::Error> {
    let incoming = read_upload_form(payload, service.max_file_size()).await?;

    let result = service.upload(&principal, incoming, query.0.expires_in).await?;

    Ok(success::Success::created(Some(result)).message("File uploaded successfully"))
}

#[get("/{file_id}")]
pub async fn get_file(
    file_id: web::Path<Uuid>,
    principal: Principal,
    query: ValidatedQuery<UploadQuery>,
    service: web::Data<FileUploadSvc>,
) -> Result<success::Success<FileUploadResponse>, error::Error> {
    let file = service.get(&principal, file_id.into_inner(), query.0.expires_in).await?;
    Ok(success::Success::ok(Some(file)))
}

#[delete("/{file_id}")]
pub async fn delete_file(
    file_id: web::Path<Uuid>,
    principal: Principal,
    service: web::Data<FileUploadSvc>,
) -> Result<success::Success<()>, error::Error> {
    service.delete(&principal, file_id.into_inner()).await?;
    Ok(success::Success::no_content())
}

/// Download through a signed URL; the token is the only credential.
#[get("/storage/{token}")]
pub async fn get_object(
    token: web::Path<String>,
    service: web::Data<FileUploadSvc>,
) -> Result<HttpResponse, error::Error> {
    let (bytes, mime_type) = service.read_object(&token).await?;
    Ok(HttpResponse::Ok().content_type(mime_type).body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{
        error::PayloadError,
        http::header::{self, HeaderMap, HeaderValue},
        web::Bytes,
    };

    const BOUNDARY: &str = "portal-boundary";

    /// Parts are `(name, filename, body)`.
    fn form(parts: &[(&str, Option<&str>, &[u8])]) -> Multipart {
        let mut body = Vec::new();
        for (name, filename, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match filename {
                Some(f) => format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: text/plain\r\n\r\n"
                ),
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(&format!("multipart/form-data; boundary={BOUNDARY}")).unwrap(),
        );
        let stream = futures_util::stream::once(async move { Ok::<_, PayloadError>(Bytes::from(body)) });
        Multipart::new(&headers, stream)
    }

    #[actix_web::test]
    async fn reads_file_and_conversation_id() {
        let conversation = Uuid::now_v7();
        let id = conversation.to_string();
        let payload = form(&[
            ("conversation_id", None, id.as_bytes()),
            ("file", Some("brief.txt"), b"hello".as_slice()),
        ]);

        let incoming = read_upload_form(payload, 1024).await.unwrap();
        assert_eq!(incoming.filename, "brief.txt");
        assert_eq!(incoming.content_type.as_deref(), Some("text/plain"));
        assert_eq!(incoming.bytes, b"hello");
        assert_eq!(incoming.conversation_id, Some(conversation));
    }

    #[actix_web::test]
    async fn oversized_conversation_id_is_rejected() {
        let padded = format!("{}{}", " ".repeat(MAX_ID_PART_BYTES), Uuid::now_v7());
        let payload = form(&[
            ("conversation_id", None, padded.as_bytes()),
            ("file", Some("brief.txt"), b"hello".as_slice()),
        ]);

        let err = read_upload_form(payload, 1024).await.unwrap_err();
        assert!(matches!(err, error::Error::BadRequest(msg) if msg == "Invalid conversation_id"));
    }

    #[actix_web::test]
    async fn unknown_parts_do_not_count_against_limits() {
        let filler = vec![b'x'; 4096];
        let payload = form(&[
            ("notes", None, filler.as_slice()),
            ("extra", None, filler.as_slice()),
            ("file", Some("brief.txt"), b"hello".as_slice()),
        ]);

        let incoming = read_upload_form(payload, 16).await.unwrap();
        assert_eq!(incoming.bytes, b"hello");
        assert_eq!(incoming.conversation_id, None);
    }

    #[actix_web::test]
    async fn file_over_the_limit_is_rejected() {
        let payload = form(&[("file", Some("big.txt"), [b'x'; 17].as_slice())]);
        assert!(matches!(read_upload_form(payload, 16).await, Err(error::Error::BadRequest(_))));

        let payload = form(&[("file", Some("fits.txt"), [b'x'; 16].as_slice())]);
        assert_eq!(read_upload_form(payload, 16).await.unwrap().bytes.len(), 16);
    }

    #[actix_web::test]
    async fn a_file_part_is_required() {
        let payload = form(&[("notes", None, b"no attachment".as_slice())]);
        assert!(matches!(read_upload_form(payload, 16).await, Err(error::Error::BadRequest(_))));
    }
}
