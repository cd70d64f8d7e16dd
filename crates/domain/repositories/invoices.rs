use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    entities::invoices::{InsertInvoiceEntity, InvoiceEntity, UpdateInvoiceEntity},
    value_objects::enums::invoice_statuses::InvoiceStatus,
};

/// Raised by writes when the `(owner_id, invoice_number)` unique index rejects
/// the row. Travels inside `anyhow::Error`; callers recover it with `downcast`.
#[derive(Debug, Error)]
#[error("invoice number {0} already exists for this owner")]
pub struct DuplicateInvoiceNumber(pub String);

/// Invoice storage. Every lookup and write is scoped by `owner_id`.
#[async_trait]
#[automock]
pub trait InvoiceRepository {
    async fn create(&self, invoice: InsertInvoiceEntity) -> Result<InvoiceEntity>;

    /// Newest first.
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<InvoiceEntity>>;

    async fn find_by_id_and_owner(
        &self,
        invoice_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<InvoiceEntity>>;

    /// Returns `None` when no invoice with this id belongs to `owner_id`.
    async fn update_by_id_and_owner(
        &self,
        invoice_id: Uuid,
        owner_id: Uuid,
        changes: UpdateInvoiceEntity,
    ) -> Result<Option<InvoiceEntity>>;

    /// Returns `false` when nothing was deleted.
    async fn delete_by_id_and_owner(&self, invoice_id: Uuid, owner_id: Uuid) -> Result<bool>;

    async fn invoice_number_taken(
        &self,
        owner_id: Uuid,
        invoice_number: String,
        exclude_invoice_id: Option<Uuid>,
    ) -> Result<bool>;

    async fn list_invoice_numbers(&self, owner_id: Uuid) -> Result<Vec<String>>;
}
