use uuid::Uuid;

use crate::{
    api::error,
    modules::profile::{
        model::{InsertProfile, UpdateProfile},
        repository::ProfileRepository,
        schema::{ProfileEntity, UserRole},
    },
};

#[derive(Clone)]
pub struct ProfileRepositoryPg {
    pool: sqlx::PgPool,
}

impl ProfileRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProfileRepository for ProfileRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ProfileEntity>, error::SystemError> {
        let profile = sqlx::query_as::<_, ProfileEntity>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProfileEntity>, error::SystemError> {
        let profile = sqlx::query_as::<_, ProfileEntity>(
            "SELECT * FROM profiles WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn find_by_role(
        &self,
        role: &UserRole,
    ) -> Result<Vec<ProfileEntity>, error::SystemError> {
        let profiles = sqlx::query_as::<_, ProfileEntity>(
            "SELECT * FROM profiles WHERE role = $1 ORDER BY full_name",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    async fn create(&self, profile: &InsertProfile) -> Result<Uuid, error::SystemError> {
        sqlx::query(
            "INSERT INTO profiles (id, email, hash_password, full_name, company, role) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.hash_password)
        .bind(&profile.full_name)
        .bind(&profile.company)
        .bind(profile.role)
        .execute(&self.pool)
        .await?;
        Ok(profile.id)
    }

    async fn update(
        &self,
        id: &Uuid,
        profile: &UpdateProfile,
    ) -> Result<Option<ProfileEntity>, error::SystemError> {
        let updated = sqlx::query_as::<_, ProfileEntity>(
            r#"
        UPDATE profiles
        SET
            full_name  = COALESCE($2, full_name),
            company    = CASE WHEN $3::boolean THEN $4 ELSE company END,
            phone      = CASE WHEN $5::boolean THEN $6 ELSE phone END,
            avatar_url = CASE WHEN $7::boolean THEN $8 ELSE avatar_url END,
            role       = COALESCE($9, role),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(&profile.full_name) // $2: Option<String>
        .bind(profile.company.is_some()) // $3: was company provided?
        .bind(profile.company.as_ref().and_then(|v| v.as_ref())) // $4
        .bind(profile.phone.is_some()) // $5
        .bind(profile.phone.as_ref().and_then(|v| v.as_ref())) // $6
        .bind(profile.avatar_url.is_some()) // $7
        .bind(profile.avatar_url.as_ref().and_then(|v| v.as_ref())) // $8
        .bind(profile.role) // $9: Option<UserRole>
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }
}
