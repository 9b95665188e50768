use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

use crate::modules::policy::Resource;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "invoice_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    /// draft -> sent -> paid, with overdue as a detour between sent and paid.
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!((self, next), (Draft, Sent) | (Sent, Paid) | (Sent, Overdue) | (Overdue, Paid))
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InvoiceEntity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub project_name: Option<String>,
    pub number: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub due_date: Option<chrono::NaiveDate>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl InvoiceEntity {
    pub fn as_resource(&self) -> Resource {
        Resource::Invoice { client_id: self.client_id, status: self.status }
    }
}
