use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

/// Inquiries come from anonymous visitors, ideas from signed-in users.
/// Both share one shape and one table layout.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Inquiry,
    Idea,
}

impl SubmissionKind {
    pub fn table(self) -> &'static str {
        match self {
            SubmissionKind::Inquiry => "inquiries",
            SubmissionKind::Idea => "ideas",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubmissionKind::Inquiry => "Inquiry",
            SubmissionKind::Idea => "Idea",
        }
    }
}

/// `New` is the unactioned state counted by notifications.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "submission_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    New,
    Reviewed,
    Archived,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubmissionEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
    pub submitted_by: Option<Uuid>,
    pub status: SubmissionStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
