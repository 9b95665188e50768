use actix_web::{get, patch, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    modules::{
        invoice::{
            model::{CreateInvoiceModel, InvoiceQuery, UpdateInvoiceModel},
            repository_pg::InvoiceRepositoryPg,
            schema::InvoiceEntity,
            service::InvoiceService,
        },
        policy::Principal,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type InvoiceSvc = InvoiceService<InvoiceRepositoryPg>;

#[get("")]
pub async fn get_invoices(
    invoice_svc: web::Data<InvoiceSvc>,
    principal: Principal,
    query: ValidatedQuery<InvoiceQuery>,
) -> Result<success::Success<Vec<InvoiceEntity>>, error::Error> {
    let invoices = invoice_svc.list(&principal, query.0.status).await?;
    Ok(success::Success::ok(Some(invoices)))
}

#[post("")]
pub async fn create_invoice(
    invoice_svc: web::Data<InvoiceSvc>,
    principal: Principal,
    body: ValidatedJson<CreateInvoiceModel>,
) -> Result<success::Success<InvoiceEntity>, error::Error> {
    let invoice = invoice_svc.create(&principal, body.0).await?;
    Ok(success::Success::created(Some(invoice)).message("Invoice created"))
}

#[get("/{invoice_id}")]
pub async fn get_invoice(
    invoice_svc: web::Data<InvoiceSvc>,
    principal: Principal,
    invoice_id: web::Path<Uuid>,
) -> Result<success::Success<InvoiceEntity>, error::Error> {
    let invoice = invoice_svc.get(&principal, invoice_id.into_inner()).await?;
    Ok(success::Success::ok(Some(invoice)))
}

#[patch("/{invoice_id}")]
pub async fn update_invoice(
    invoice_svc: web::Data<InvoiceSvc>,
    principal: Principal,
    invoice_id: web::Path<Uuid>,
    body: ValidatedJson<UpdateInvoiceModel>,
) -> Result<success::Success<InvoiceEntity>, error::Error> {
    let invoice = invoice_svc.update(&principal, invoice_id.into_inner(), body.0.into()).await?;
    Ok(success::Success::ok(Some(invoice)).message("Invoice updated"))
}
