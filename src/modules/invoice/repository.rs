use uuid::Uuid;

use crate::{
    api::error,
    modules::invoice::{
        model::{NewInvoice, UpdateInvoice},
        schema::{InvoiceEntity, InvoiceStatus},
    },
};

#[async_trait::async_trait]
pub trait InvoiceRepository {
    async fn find_by_id(&self, invoice_id: &Uuid) -> Result<Option<InvoiceEntity>, error::SystemError>;

    /// Newest first. `client_id = None` means every client; drafts are only
    /// returned when `include_drafts` is set.
    async fn find_all(
        &self,
        client_id: Option<&Uuid>,
        status: Option<&InvoiceStatus>,
        include_drafts: bool,
    ) -> Result<Vec<InvoiceEntity>, error::SystemError>;

    async fn create(&self, invoice: &NewInvoice) -> Result<InvoiceEntity, error::SystemError>;

    async fn update(
        &self,
        invoice_id: &Uuid,
        changes: &UpdateInvoice,
    ) -> Result<Option<InvoiceEntity>, error::SystemError>;
}
