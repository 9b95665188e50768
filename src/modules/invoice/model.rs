use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::modules::invoice::schema::InvoiceStatus;
use crate::utils::double_option;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceModel {
    pub client_id: Uuid,
    #[validate(length(max = 200))]
    pub project_name: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Invoice number must be 1-50 characters"))]
    pub number: String,
    #[validate(range(min = 0, message = "Amount cannot be negative"))]
    pub amount_cents: i64,
    #[validate(length(equal = 3, message = "Currency must be an ISO 4217 code"))]
    pub currency: Option<String>,
    pub due_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInvoiceModel {
    pub status: Option<InvoiceStatus>,
    #[validate(length(max = 200))]
    pub project_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<chrono::NaiveDate>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InvoiceQuery {
    pub status: Option<InvoiceStatus>,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub id: Uuid,
    pub client_id: Uuid,
    pub project_name: Option<String>,
    pub number: String,
    pub amount_cents: i64,
    pub currency: String,
    pub due_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateInvoice {
    pub status: Option<InvoiceStatus>,
    pub project_name: Option<String>,
    pub due_date: Option<Option<chrono::NaiveDate>>,
}

impl UpdateInvoice {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.project_name.is_none() && self.due_date.is_none()
    }
}

impl From<UpdateInvoiceModel> for UpdateInvoice {
    fn from(model: UpdateInvoiceModel) -> Self {
        UpdateInvoice { status: model.status, project_name: model.project_name, due_date: model.due_date }
    }
}
