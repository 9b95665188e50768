use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::configs::RedisCache;
use crate::constants::PROFILE_CACHE_TTL;
use crate::modules::policy::{self, Action, Principal, Resource};
use crate::modules::profile::model::{
    InsertProfile, ProfileResponse, SignInModel, SignUpModel, UpdateProfile, UpdateProfileModel,
};
use crate::modules::profile::{repository::ProfileRepository, schema::UserRole};
use crate::utils::{hash_password, verify_password, Claims, TypeClaims};
use crate::ENV;

#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn ProfileRepository + Send + Sync>,
    /// `None` runs without Redis: no profile cache, no refresh tokens.
    cache: Option<Arc<RedisCache>>,
}

fn cache_key(id: &Uuid) -> String {
    format!("profile:{id}")
}

impl ProfileService {
    pub fn with_dependencies(
        repo: Arc<dyn ProfileRepository + Send + Sync>,
        cache: Option<Arc<RedisCache>>,
    ) -> Self {
        info!("ProfileService initialized with dependencies");
        ProfileService { repo, cache }
    }

    async fn load(&self, id: Uuid) -> Result<Option<ProfileResponse>, error::SystemError> {
        let key = cache_key(&id);
        if let Some(cache) = &self.cache {
            match cache.get::<ProfileResponse>(&key).await {
                Ok(Some(profile)) => return Ok(Some(profile)),
                Ok(None) => {}
                Err(e) => warn!("Profile cache read failed for {id}: {e}"),
            }
        }

        let Some(entity) = self.repo.find_by_id(&id).await? else {
            return Ok(None);
        };
        let profile = ProfileResponse::from(entity);

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &profile, PROFILE_CACHE_TTL).await {
                warn!("Profile cache write failed for {id}: {e}");
            }
        }
        Ok(Some(profile))
    }

    async fn evict(&self, id: &Uuid) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.delete(&cache_key(id)).await {
                warn!("Profile cache eviction failed for {id}: {e}");
            }
        }
    }

    /// Role of an authenticated principal, read from its profile.
    pub async fn resolve_role(
        &self,
        principal_id: Option<Uuid>,
    ) -> Result<UserRole, error::SystemError> {
        let id = principal_id.ok_or_else(|| error::SystemError::unauthorized("Unauthorized"))?;
        let profile =
            self.load(id).await?.ok_or_else(|| error::SystemError::not_found("Profile not found"))?;
        Ok(profile.role)
    }

    /// Builds the request principal. A missing profile leaves the role empty
    /// rather than failing the request.
    pub async fn principal(&self, claims: &Claims) -> Result<Principal, error::SystemError> {
        let role = match self.resolve_role(Some(claims.sub)).await {
            Ok(role) => Some(role),
            Err(error::SystemError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        Ok(Principal { id: claims.sub, email: claims.email.clone(), role })
    }

    pub async fn get_profile(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<ProfileResponse, error::SystemError> {
        policy::require_visible(principal, &Resource::Profile { owner_id: id }, Action::Read, "Profile")?;
        self.load(id).await?.ok_or_else(|| error::SystemError::not_found("Profile not found"))
    }

    /// Assignee candidates and client directory for the admin portal.
    pub async fn list_by_role(
        &self,
        principal: &Principal,
        role: UserRole,
    ) -> Result<Vec<ProfileResponse>, error::SystemError> {
        policy::require(principal, &Resource::Directory, Action::Read)?;
        let profiles = self.repo.find_by_role(&role).await?;
        Ok(profiles.into_iter().map(ProfileResponse::from).collect())
    }

    pub async fn update_profile(
        &self,
        principal: &Principal,
        id: Uuid,
        model: UpdateProfileModel,
    ) -> Result<ProfileResponse, error::SystemError> {
        if model.is_empty() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let resource = Resource::Profile { owner_id: id };
        policy::require_visible(principal, &resource, Action::Update, "Profile")?;
        if model.role.is_some() {
            policy::require(principal, &resource, Action::ChangeRole)?;
        }

        let changes = UpdateProfile {
            full_name: model.full_name,
            company: model.company,
            phone: model.phone,
            avatar_url: model.avatar_url,
            role: model.role,
        };

        let updated = self
            .repo
            .update(&id, &changes)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Profile not found"))?;

        self.evict(&id).await;
        if let Some(role) = changes.role {
            info!("Profile {id} role set to {role:?} by {}", principal.id);
        }
        Ok(ProfileResponse::from(updated))
    }

    pub async fn sign_up(&self, model: SignUpModel) -> Result<Uuid, error::SystemError> {
        let hash_password = hash_password(&model.password)?;

        let new_profile = InsertProfile {
            id: Uuid::now_v7(),
            email: model.email.trim().to_lowercase(),
            hash_password,
            full_name: model.full_name,
            company: model.company,
            role: UserRole::Client,
        };

        self.repo.create(&new_profile).await
    }

    pub async fn sign_in(&self, model: SignInModel) -> Result<(String, String), error::SystemError> {
        let profile = self
            .repo
            .find_by_email(&model.email)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid email or password"))?;

        if !verify_password(&profile.hash_password, &model.password)? {
            return Err(error::SystemError::unauthorized("Invalid email or password"));
        }

        self.issue_tokens(profile.id, &profile.email).await
    }

    async fn issue_tokens(
        &self,
        id: Uuid,
        email: &str,
    ) -> Result<(String, String), error::SystemError> {
        let access_token = Claims::new(&id, email, ENV.access_token_expiration)
            .with_type(TypeClaims::AccessToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let jti = Uuid::now_v7();
        let refresh_token = Claims::new(&id, email, ENV.refresh_token_expiration)
            .with_jti(jti)
            .with_type(TypeClaims::RefreshToken)
            .encode(ENV.jwt_secret.as_ref())?;

        let cache = self.refresh_store()?;
        cache
            .set(&format!("refresh_token:{jti}"), &id, ENV.refresh_token_expiration as usize)
            .await?;

        Ok((access_token, refresh_token))
    }

    fn refresh_store(&self) -> Result<&RedisCache, error::SystemError> {
        self.cache.as_deref().ok_or_else(|| {
            error::SystemError::InternalError("refresh tokens need a Redis cache".into())
        })
    }

    /// Rotates a refresh token: the presented one is revoked, a new pair issued.
    pub async fn refresh(
        &self,
        refresh_token: Option<String>,
    ) -> Result<(String, String), error::SystemError> {
        let token = refresh_token
            .ok_or_else(|| error::SystemError::unauthorized("Missing refresh token"))?;
        let claims = Claims::decode(&token, ENV.jwt_secret.as_ref())
            .map_err(|_| error::SystemError::unauthorized("Token Invalid or Expired"))?;

        let jti = match (&claims._type, claims.jti) {
            (Some(TypeClaims::RefreshToken), Some(jti)) => jti,
            _ => return Err(error::SystemError::unauthorized("Token Invalid or Expired")),
        };

        let revoked = !self.refresh_store()?.delete(&format!("refresh_token:{jti}")).await?;
        if revoked {
            return Err(error::SystemError::unauthorized("Token Invalid or Expired"));
        }

        self.issue_tokens(claims.sub, &claims.email).await
    }

    pub async fn sign_out(&self, refresh_token: Option<String>) -> Result<(), error::SystemError> {
        let Some(token) = refresh_token else {
            return Ok(());
        };
        // expired or foreign tokens have nothing left to revoke
        if let Ok(Claims { jti: Some(jti), .. }) = Claims::decode(&token, ENV.jwt_secret.as_ref()) {
            self.refresh_store()?.delete(&format!("refresh_token:{jti}")).await?;
        }
        Ok(())
    }
}
