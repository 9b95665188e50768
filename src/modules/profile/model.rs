use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::profile::schema::{ProfileEntity, UserRole};
use crate::utils::double_option;

#[derive(Deserialize, Validate)]
pub struct SignUpModel {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    pub full_name: String,
    pub company: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct SignInModel {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateProfileModel {
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(min = 6, message = "Phone number must be at least 6 digits long"))]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(url(message = "Avatar must be a URL"))]
    pub avatar_url: Option<Option<String>>,
    pub role: Option<UserRole>,
}

impl UpdateProfileModel {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.company.is_none()
            && self.phone.is_none()
            && self.avatar_url.is_none()
            && self.role.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct InsertProfile {
    pub id: Uuid,
    pub email: String,
    pub hash_password: String,
    pub full_name: String,
    pub company: Option<String>,
    pub role: UserRole,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub company: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
    pub role: Option<UserRole>,
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub id: Uuid,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
}

impl From<ProfileEntity> for ProfileResponse {
    fn from(entity: ProfileEntity) -> Self {
        ProfileResponse {
            id: entity.id,
            email: entity.email,
            full_name: entity.full_name,
            company: entity.company,
            phone: entity.phone,
            avatar_url: entity.avatar_url,
            role: entity.role,
        }
    }
}
