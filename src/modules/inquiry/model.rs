use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::modules::inquiry::schema::SubmissionStatus;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitModel {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(max = 200))]
    pub company: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubmissionModel {
    pub status: SubmissionStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmissionQuery {
    pub status: Option<SubmissionStatus>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
    pub submitted_by: Option<Uuid>,
}

impl NewSubmission {
    pub fn from_model(model: SubmitModel, submitted_by: Option<Uuid>) -> Self {
        NewSubmission {
            id: Uuid::now_v7(),
            name: model.name.trim().to_string(),
            email: model.email.trim().to_lowercase(),
            company: model.company.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            message: model.message.trim().to_string(),
            submitted_by,
        }
    }
}
