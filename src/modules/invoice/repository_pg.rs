use uuid::Uuid;

use crate::{
    api::error,
    modules::invoice::{
        model::{NewInvoice, UpdateInvoice},
        repository::InvoiceRepository,
        schema::{InvoiceEntity, InvoiceStatus},
    },
};

#[derive(Clone)]
pub struct InvoiceRepositoryPg {
    pool: sqlx::PgPool,
}

impl InvoiceRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InvoiceRepository for InvoiceRepositoryPg {
    async fn find_by_id(&self, invoice_id: &Uuid) -> Result<Option<InvoiceEntity>, error::SystemError> {
        let invoice = sqlx::query_as::<_, InvoiceEntity>("SELECT * FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    async fn find_all(
        &self,
        client_id: Option<&Uuid>,
        status: Option<&InvoiceStatus>,
        include_drafts: bool,
    ) -> Result<Vec<InvoiceEntity>, error::SystemError> {
        let invoices = sqlx::query_as::<_, InvoiceEntity>(
            r#"
            SELECT * FROM invoices
            WHERE ($1::uuid IS NULL OR client_id = $1)
              AND ($2::invoice_status IS NULL OR status = $2)
              AND ($3 OR status <> 'draft')
            ORDER BY created_at DESC
            "#,
        )
        .bind(client_id)
        .bind(status)
        .bind(include_drafts)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    async fn create(&self, invoice: &NewInvoice) -> Result<InvoiceEntity, error::SystemError> {
        let created = sqlx::query_as::<_, InvoiceEntity>(
            r#"
            INSERT INTO invoices (id, client_id, project_name, number, amount_cents, currency, status, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, 'draft', $7)
            RETURNING *
            "#,
        )
        .bind(invoice.id)
        .bind(invoice.client_id)
        .bind(&invoice.project_name)
        .bind(&invoice.number)
        .bind(invoice.amount_cents)
        .bind(&invoice.currency)
        .bind(invoice.due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(
        &self,
        invoice_id: &Uuid,
        changes: &UpdateInvoice,
    ) -> Result<Option<InvoiceEntity>, error::SystemError> {
        let updated = sqlx::query_as::<_, InvoiceEntity>(
            r#"
            UPDATE invoices
            SET
                status       = COALESCE($2, status),
                project_name = COALESCE($3, project_name),
                due_date     = CASE WHEN $4::boolean THEN $5 ELSE due_date END,
                updated_at   = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(invoice_id)
        .bind(changes.status)
        .bind(&changes.project_name)
        .bind(changes.due_date.is_some())
        .bind(changes.due_date.flatten())
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }
}
