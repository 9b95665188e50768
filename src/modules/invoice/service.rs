use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        invoice::{
            model::{CreateInvoiceModel, NewInvoice, UpdateInvoice},
            repository::InvoiceRepository,
            schema::{InvoiceEntity, InvoiceStatus},
        },
        policy::{self, Action, Principal, Resource},
        profile::{repository::ProfileRepository, schema::UserRole},
    },
};

#[derive(Clone)]
pub struct InvoiceService<R>
where
    R: InvoiceRepository + Send + Sync + 'static,
{
    invoice_repo: Arc<R>,
    profile_repo: Arc<dyn ProfileRepository + Send + Sync>,
}

impl<R> InvoiceService<R>
where
    R: InvoiceRepository + Send + Sync + 'static,
{
    pub fn with_dependencies(
        invoice_repo: Arc<R>,
        profile_repo: Arc<dyn ProfileRepository + Send + Sync>,
    ) -> Self {
        InvoiceService { invoice_repo, profile_repo }
    }

    /// Admin and staff see every invoice; clients only their own, minus drafts.
    pub async fn list(
        &self,
        principal: &Principal,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<InvoiceEntity>, error::SystemError> {
        let elevated = principal.is_elevated();
        let scope = if elevated { None } else { Some(&principal.id) };

        let mut invoices = self.invoice_repo.find_all(scope, status.as_ref(), elevated).await?;
        invoices.retain(|i| policy::authorize(Some(principal), &i.as_resource(), Action::Read).is_allowed());

        Ok(invoices)
    }

    pub async fn get(
        &self,
        principal: &Principal,
        invoice_id: Uuid,
    ) -> Result<InvoiceEntity, error::SystemError> {
        let invoice = self
            .invoice_repo
            .find_by_id(&invoice_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Invoice not found"))?;

        policy::require_visible(principal, &invoice.as_resource(), Action::Read, "Invoice")?;
        Ok(invoice)
    }

    pub async fn create(
        &self,
        principal: &Principal,
        model: CreateInvoiceModel,
    ) -> Result<InvoiceEntity, error::SystemError> {
        policy::require(
            principal,
            &Resource::Invoice { client_id: model.client_id, status: InvoiceStatus::Draft },
            Action::Create,
        )?;

        let billed_client = self
            .profile_repo
            .find_by_id(&model.client_id)
            .await?
            .is_some_and(|p| p.role == UserRole::Client);
        if !billed_client {
            return Err(error::SystemError::bad_request("Invoices can only be issued to clients"));
        }

        let invoice = self
            .invoice_repo
            .create(&NewInvoice {
                id: Uuid::now_v7(),
                client_id: model.client_id,
                project_name: model.project_name,
                number: model.number.trim().to_string(),
                amount_cents: model.amount_cents,
                currency: model.currency.unwrap_or_else(|| "EUR".to_string()).to_ascii_uppercase(),
                due_date: model.due_date,
            })
            .await?;

        log::info!("Invoice {} drafted for {} by {}", invoice.number, invoice.client_id, principal.id);
        Ok(invoice)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        invoice_id: Uuid,
        changes: UpdateInvoice,
    ) -> Result<InvoiceEntity, error::SystemError> {
        if changes.is_empty() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let invoice = self.get(principal, invoice_id).await?;
        policy::require(principal, &invoice.as_resource(), Action::Update)?;

        if let Some(next) = changes.status {
            if next != invoice.status && !invoice.status.can_transition_to(next) {
                return Err(error::SystemError::bad_request(format!(
                    "Invoice cannot move from {:?} to {:?}",
                    invoice.status, next
                )));
            }
        }

        let updated = self
            .invoice_repo
            .update(&invoice_id, &changes)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Invoice not found"))?;

        if updated.status != invoice.status {
            log::info!("Invoice {} moved to {:?} by {}", updated.number, updated.status, principal.id);
        }
        Ok(updated)
    }
}
