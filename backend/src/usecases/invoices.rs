use std::sync::Arc;

use anyhow::Context;
use axum::http::StatusCode;
use chrono::Utc;
use crates::domain::{
    entities::invoices::{InsertInvoiceEntity, UpdateInvoiceEntity},
    repositories::invoices::{DuplicateInvoiceNumber, InvoiceRepository},
    value_objects::{
        enums::invoice_statuses::InvoiceStatus,
        invoices::{
            InsertInvoiceModel, InvoiceDto, ListInvoicesFilter, UpdateInvoiceModel,
            next_invoice_number,
        },
        totals::compute_totals,
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Invoice not found")]
    NotFound,
    #[error("Invoice number {0} already exists")]
    DuplicateNumber(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl InvoiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            InvoiceError::Validation(_) => StatusCode::BAD_REQUEST,
            InvoiceError::NotFound => StatusCode::NOT_FOUND,
            InvoiceError::DuplicateNumber(_) => StatusCode::CONFLICT,
            InvoiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, InvoiceError>;

/// Owner-scoped invoice CRUD. Totals are recomputed on every write.
pub struct InvoiceUseCase<R>
where
    R: InvoiceRepository + Send + Sync + 'static,
{
    invoice_repository: Arc<R>,
}

/// Typed fields shared by create and update after validation and pricing.
struct PreparedInvoice {
    invoice_number: String,
    invoice_date: chrono::NaiveDate,
    due_date: Option<chrono::NaiveDate>,
    bill_from: serde_json::Value,
    bill_to: serde_json::Value,
    items: serde_json::Value,
    notes: Option<String>,
    payment_terms: String,
    sub_total: f64,
    tax_total: f64,
    total: f64,
}

fn prepare(model: &InsertInvoiceModel) -> UseCaseResult<PreparedInvoice> {
    let invoice_date = model.invoice_date.unwrap_or_else(|| Utc::now().date_naive());
    model.validate(invoice_date).map_err(InvoiceError::Validation)?;

    let items = model.priced_items();
    let totals = compute_totals(&model.items);

    Ok(PreparedInvoice {
        invoice_number: model.invoice_number.trim().to_string(),
        invoice_date,
        due_date: model.due_date,
        bill_from: serde_json::to_value(&model.bill_from).context("failed to encode bill_from")?,
        bill_to: serde_json::to_value(&model.bill_to).context("failed to encode bill_to")?,
        items: serde_json::to_value(&items).context("failed to encode items")?,
        notes: model
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(str::to_string),
        payment_terms: model.payment_terms_or_default(),
        sub_total: totals.sub_total,
        tax_total: totals.tax_total,
        total: totals.total,
    })
}

impl<R> InvoiceUseCase<R>
where
    R: InvoiceRepository + Send + Sync + 'static,
{
    pub fn new(invoice_repository: Arc<R>) -> Self {
        Self { invoice_repository }
    }

    async fn ensure_number_available(
        &self,
        owner_id: Uuid,
        invoice_number: &str,
        exclude_invoice_id: Option<Uuid>,
    ) -> UseCaseResult<()> {
        let taken = self
            .invoice_repository
            .invoice_number_taken(owner_id, invoice_number.to_string(), exclude_invoice_id)
            .await
            .map_err(|err| {
                error!(
                    %owner_id,
                    db_error = ?err,
                    "invoices: failed to check invoice number"
                );
                err.context("Error checking invoice number")
            })?;

        if taken {
            warn!(
                %owner_id,
                invoice_number,
                status = StatusCode::CONFLICT.as_u16(),
                "invoices: duplicate invoice number"
            );
            return Err(InvoiceError::DuplicateNumber(invoice_number.to_string()));
        }

        Ok(())
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        model: InsertInvoiceModel,
    ) -> UseCaseResult<InvoiceDto> {
        info!(%owner_id, items = model.items.len(), "invoices: create requested");

        let prepared = prepare(&model).map_err(|err| {
            warn!(%owner_id, error = %err, "invoices: create rejected");
            err
        })?;

        self.ensure_number_available(owner_id, &prepared.invoice_number, None)
            .await?;

        let now = Utc::now();
        let insert_invoice_entity = InsertInvoiceEntity {
            owner_id,
            invoice_number: prepared.invoice_number,
            invoice_date: prepared.invoice_date,
            due_date: prepared.due_date,
            bill_from: prepared.bill_from,
            bill_to: prepared.bill_to,
            items: prepared.items,
            notes: prepared.notes,
            payment_terms: prepared.payment_terms,
            status: InvoiceStatus::default().to_string(),
            sub_total: prepared.sub_total,
            tax_total: prepared.tax_total,
            total: prepared.total,
            created_at: now,
            updated_at: now,
        };

        let invoice = self
            .invoice_repository
            .create(insert_invoice_entity)
            .await
            .map_err(|err| match err.downcast::<DuplicateInvoiceNumber>() {
                Ok(DuplicateInvoiceNumber(number)) => {
                    warn!(%owner_id, invoice_number = %number, "invoices: number claimed by a concurrent write");
                    InvoiceError::DuplicateNumber(number)
                }
                Err(err) => {
                    error!(%owner_id, db_error = ?err, "invoices: failed to create invoice");
                    InvoiceError::Internal(err.context("Error creating invoice"))
                }
            })?;

        info!(%owner_id, invoice_id = %invoice.id, total = invoice.total, "invoices: created");
        Ok(invoice.into())
    }

    pub async fn list(
        &self,
        owner_id: Uuid,
        filter: ListInvoicesFilter,
    ) -> UseCaseResult<Vec<InvoiceDto>> {
        let invoices = self
            .invoice_repository
            .list_by_owner(owner_id, filter.status)
            .await
            .map_err(|err| {
                error!(%owner_id, db_error = ?err, "invoices: failed to list invoices");
                err.context("Error fetching invoices")
            })?;

        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);

        Ok(invoices
            .into_iter()
            .filter(|invoice| match needle.as_deref() {
                Some(needle) => invoice.matches_search(needle),
                None => true,
            })
            .map(InvoiceDto::from)
            .collect())
    }

    pub async fn get(&self, owner_id: Uuid, invoice_id: Uuid) -> UseCaseResult<InvoiceDto> {
        let invoice = self
            .invoice_repository
            .find_by_id_and_owner(invoice_id, owner_id)
            .await
            .map_err(|err| {
                error!(%owner_id, %invoice_id, db_error = ?err, "invoices: failed to fetch invoice");
                err.context("Error fetching invoice")
            })?
            .ok_or(InvoiceError::NotFound)?;

        Ok(invoice.into())
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        model: UpdateInvoiceModel,
    ) -> UseCaseResult<InvoiceDto> {
        info!(%owner_id, %invoice_id, "invoices: update requested");

        let prepared = prepare(&model.invoice).map_err(|err| {
            warn!(%owner_id, %invoice_id, error = %err, "invoices: update rejected");
            err
        })?;

        self.ensure_number_available(owner_id, &prepared.invoice_number, Some(invoice_id))
            .await?;

        let changes = UpdateInvoiceEntity {
            invoice_number: Some(prepared.invoice_number),
            invoice_date: Some(prepared.invoice_date),
            due_date: Some(prepared.due_date),
            bill_from: Some(prepared.bill_from),
            bill_to: Some(prepared.bill_to),
            items: Some(prepared.items),
            notes: Some(prepared.notes),
            payment_terms: Some(prepared.payment_terms),
            status: model.status.map(|status| status.to_string()),
            sub_total: Some(prepared.sub_total),
            tax_total: Some(prepared.tax_total),
            total: Some(prepared.total),
            updated_at: Some(Utc::now()),
        };

        let invoice = self
            .invoice_repository
            .update_by_id_and_owner(invoice_id, owner_id, changes)
            .await
            .map_err(|err| match err.downcast::<DuplicateInvoiceNumber>() {
                Ok(DuplicateInvoiceNumber(number)) => {
                    warn!(%owner_id, %invoice_id, invoice_number = %number, "invoices: number claimed by a concurrent write");
                    InvoiceError::DuplicateNumber(number)
                }
                Err(err) => {
                    error!(%owner_id, %invoice_id, db_error = ?err, "invoices: failed to update invoice");
                    InvoiceError::Internal(err.context("Error updating invoice"))
                }
            })?
            .ok_or(InvoiceError::NotFound)?;

        info!(%owner_id, %invoice_id, total = invoice.total, "invoices: updated");
        Ok(invoice.into())
    }

    pub async fn update_status(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
        status: InvoiceStatus,
    ) -> UseCaseResult<InvoiceDto> {
        let changes = UpdateInvoiceEntity {
            status: Some(status.to_string()),
            updated_at: Some(Utc::now()),
            ..UpdateInvoiceEntity::default()
        };

        let invoice = self
            .invoice_repository
            .update_by_id_and_owner(invoice_id, owner_id, changes)
            .await
            .map_err(|err| {
                error!(%owner_id, %invoice_id, db_error = ?err, "invoices: failed to change status");
                err.context("Error updating invoice status")
            })?
            .ok_or(InvoiceError::NotFound)?;

        info!(%owner_id, %invoice_id, status = %status, "invoices: status changed");
        Ok(invoice.into())
    }

    pub async fn delete(&self, owner_id: Uuid, invoice_id: Uuid) -> UseCaseResult<()> {
        let deleted = self
            .invoice_repository
            .delete_by_id_and_owner(invoice_id, owner_id)
            .await
            .map_err(|err| {
                error!(%owner_id, %invoice_id, db_error = ?err, "invoices: failed to delete invoice");
                err.context("Error deleting invoice")
            })?;

        if !deleted {
            return Err(InvoiceError::NotFound);
        }

        info!(%owner_id, %invoice_id, "invoices: deleted");
        Ok(())
    }

    pub async fn next_invoice_number(&self, owner_id: Uuid) -> UseCaseResult<String> {
        let numbers = self
            .invoice_repository
            .list_invoice_numbers(owner_id)
            .await
            .map_err(|err| {
                error!(%owner_id, db_error = ?err, "invoices: failed to list invoice numbers");
                err.context("Error suggesting invoice number")
            })?;

        Ok(next_invoice_number(numbers.iter().map(String::as_str)))
    }
}
