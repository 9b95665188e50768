//! Object storage and signed, expiring download URLs.
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::api::error;

#[async_trait::async_trait]
pub trait ObjectStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), error::SystemError>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError>;

    /// Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> Result<(), error::SystemError>;
}

/// Objects as plain files below `root`, one directory per owner.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, error::SystemError> {
        let relative = Path::new(key);
        let plain = !key.is_empty() && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(error::SystemError::bad_request("Invalid object key"));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), error::SystemError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), error::SystemError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// One hour.
pub const MIN_URL_TTL: u64 = 3_600;
/// One year.
pub const MAX_URL_TTL: u64 = 31_536_000;

#[derive(Debug, Serialize, Deserialize)]
struct ObjectClaims {
    key: String,
    mime: String,
    exp: u64,
}

#[derive(Debug, Clone)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

/// What a valid download token grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectGrant {
    pub key: String,
    pub mime_type: String,
}

pub struct UrlSigner {
    secret: Vec<u8>,
    base_url: String,
    default_ttl: u64,
}

impl UrlSigner {
    pub fn new(secret: &[u8], base_url: &str, default_ttl: u64) -> Self {
        Self {
            secret: secret.to_vec(),
            base_url: base_url.trim_end_matches('/').to_string(),
            default_ttl: default_ttl.clamp(MIN_URL_TTL, MAX_URL_TTL),
        }
    }

    pub fn clamp_ttl(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.default_ttl).clamp(MIN_URL_TTL, MAX_URL_TTL)
    }

    pub fn sign(
        &self,
        key: &str,
        mime_type: &str,
        requested_ttl: Option<u64>,
    ) -> Result<SignedUrl, error::SystemError> {
        self.sign_at(key, mime_type, requested_ttl, chrono::Utc::now().timestamp())
    }

    fn sign_at(
        &self,
        key: &str,
        mime_type: &str,
        requested_ttl: Option<u64>,
        now: i64,
    ) -> Result<SignedUrl, error::SystemError> {
        let exp = now + self.clamp_ttl(requested_ttl) as i64;
        let claims = ObjectClaims { key: key.to_string(), mime: mime_type.to_string(), exp: exp as u64 };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(&self.secret))?;

        let expires_at = chrono::DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| error::SystemError::bad_request("Expiry out of range"))?;

        Ok(SignedUrl { url: format!("{}/api/storage/{}", self.base_url, token), expires_at })
    }

    /// Any failure (bad signature, expiry, wrong shape) is `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<ObjectGrant, error::SystemError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<ObjectClaims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map_err(|_| error::SystemError::unauthorized("Link invalid or expired"))?;

        Ok(ObjectGrant { key: data.claims.key, mime_type: data.claims.mime })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> UrlSigner {
        UrlSigner::new(b"storage-secret", "http://files.test/", 3_600)
    }

    fn token_of(url: &str) -> &str {
        url.rsplit('/').next().unwrap()
    }

    #[test]
    fn ttl_is_clamped_to_an_hour_and_a_year() {
        let signer = signer();
        assert_eq!(signer.clamp_ttl(Some(1)), MIN_URL_TTL);
        assert_eq!(signer.clamp_ttl(Some(86_400)), 86_400);
        assert_eq!(signer.clamp_ttl(Some(u64::MAX)), MAX_URL_TTL);
        assert_eq!(signer.clamp_ttl(None), 3_600);
    }

    #[test]
    fn signed_url_round_trips_to_its_object() {
        let signer = signer();
        let signed = signer.sign("owner/a.pdf", "application/pdf", Some(7_200)).unwrap();
        assert!(signed.url.starts_with("http://files.test/api/storage/"));

        let remaining = signed.expires_at.timestamp() - chrono::Utc::now().timestamp();
        assert!((7_100..=7_200).contains(&remaining));

        let grant = signer.verify(token_of(&signed.url)).unwrap();
        assert_eq!(grant, ObjectGrant { key: "owner/a.pdf".into(), mime_type: "application/pdf".into() });
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let signed = signer().sign("owner/a.pdf", "application/pdf", None).unwrap();
        let token = token_of(&signed.url);

        let other = UrlSigner::new(b"another-secret", "http://files.test", 3_600);
        assert!(matches!(other.verify(token), Err(error::SystemError::Unauthorized(_))));

        let mut forged = token.to_string();
        forged.push('x');
        assert!(matches!(signer().verify(&forged), Err(error::SystemError::Unauthorized(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let signer = signer();
        let long_ago = chrono::Utc::now().timestamp() - 2 * MAX_URL_TTL as i64;
        let signed = signer.sign_at("owner/a.pdf", "application/pdf", None, long_ago).unwrap();

        assert!(matches!(signer.verify(token_of(&signed.url)), Err(error::SystemError::Unauthorized(_))));
    }

    #[actix_web::test]
    async fn local_storage_keeps_keys_inside_its_root() {
        let root = std::env::temp_dir().join(format!("portal-storage-{}", uuid::Uuid::now_v7()));
        let storage = LocalStorage::new(&root);

        storage.put("owner/file.txt", b"hello").await.unwrap();
        assert_eq!(storage.get("owner/file.txt").await.unwrap().as_deref(), Some(&b"hello"[..]));

        storage.delete("owner/file.txt").await.unwrap();
        assert_eq!(storage.get("owner/file.txt").await.unwrap(), None);
        storage.delete("owner/file.txt").await.unwrap();

        for key in ["../escape", "/etc/passwd", "owner/../../x", ""] {
            assert!(matches!(storage.put(key, b"x").await, Err(error::SystemError::BadRequest(_))));
        }

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
