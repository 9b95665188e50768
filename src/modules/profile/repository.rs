use uuid::Uuid;

use crate::{
    api::error,
    modules::profile::{
        model::{InsertProfile, UpdateProfile},
        schema::{ProfileEntity, UserRole},
    },
};

#[async_trait::async_trait]
pub trait ProfileRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ProfileEntity>, error::SystemError>;

    async fn find_by_email(&self, email: &str)
        -> Result<Option<ProfileEntity>, error::SystemError>;

    async fn find_by_role(&self, role: &UserRole)
        -> Result<Vec<ProfileEntity>, error::SystemError>;

    async fn create(&self, profile: &InsertProfile) -> Result<Uuid, error::SystemError>;

    /// Returns `None` when no row matched.
    async fn update(
        &self,
        id: &Uuid,
        profile: &UpdateProfile,
    ) -> Result<Option<ProfileEntity>, error::SystemError>;
}
